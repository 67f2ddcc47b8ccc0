use super::*;
use crate::test_support::course;
use catalog_shared::domain::{CourseRef, PrerequisiteEntry};

fn store(courses: Vec<Course>) -> CatalogStore {
    let mut store = CatalogStore::new();
    store.load(courses);
    store
}

#[test]
fn prerequisite_of_others_tracks_references_from_other_courses() {
    let store = store(vec![
        course("CS101", "Intro", "basics", &[]),
        course("CS201", "Data Structures", "trees", &["CS101"]),
        course("AR100", "Drawing", "lines", &[]),
    ]);

    assert!(store.is_prerequisite_of_others(&"CS101".into()));
    assert!(!store.is_prerequisite_of_others(&"CS201".into()));
    assert!(!store.is_prerequisite_of_others(&"AR100".into()));
    assert!(!store.can_delete(&"CS101".into()));
    assert!(store.can_delete(&"AR100".into()));
}

#[test]
fn fresh_course_is_not_a_prerequisite() {
    let store = store(vec![course("CS101", "Intro", "basics", &[])]);
    assert!(!store.is_prerequisite_of_others(&"NEW1".into()));
}

#[test]
fn self_reference_does_not_count_as_other_course() {
    let store = store(vec![course("CS101", "Intro", "basics", &["CS101"])]);
    assert!(!store.is_prerequisite_of_others(&"CS101".into()));
}

#[test]
fn prerequisite_fact_follows_set_changes() {
    let mut store = store(vec![
        course("CS101", "Intro", "basics", &[]),
        course("CS201", "Data Structures", "trees", &["CS101"]),
    ]);
    assert!(store.is_prerequisite_of_others(&"CS101".into()));

    store.upsert(course("CS201", "Data Structures", "trees", &[]));
    assert!(!store.is_prerequisite_of_others(&"CS101".into()));

    store.upsert(course("CS301", "Algorithms", "graphs", &["CS101"]));
    assert!(store.is_prerequisite_of_others(&"CS101".into()));

    store.remove(&"CS301".into());
    assert!(!store.is_prerequisite_of_others(&"CS101".into()));
}

#[test]
fn resolved_prerequisite_payload_counts_as_reference() {
    let mut dependent = course("CS201", "Data Structures", "trees", &[]);
    dependent.prerequisite_ids = None;
    dependent.prerequisites = Some(vec![PrerequisiteEntry::Resolved(CourseRef {
        course_id: "CS101".into(),
        title: "Intro".into(),
    })]);
    let store = store(vec![course("CS101", "Intro", "basics", &[]), dependent]);
    assert!(store.is_prerequisite_of_others(&"CS101".into()));
}

#[test]
fn upsert_replaces_in_place_and_appends_new_ids() {
    let mut store = store(vec![
        course("CS101", "Intro", "basics", &[]),
        course("CS201", "Data Structures", "trees", &[]),
    ]);

    store.upsert(course("CS101", "Intro to Computing", "basics", &[]));
    store.upsert(course("MA101", "Calculus", "limits", &[]));

    let ids: Vec<&str> = store.courses().iter().map(|c| c.course_id.as_str()).collect();
    assert_eq!(ids, vec!["CS101", "CS201", "MA101"]);
    assert_eq!(
        store.get(&"CS101".into()).map(|c| c.title.as_str()),
        Some("Intro to Computing")
    );
}

#[test]
fn load_replaces_the_whole_set() {
    let mut store = store(vec![course("CS101", "Intro", "basics", &[])]);
    store.load(vec![course("MA101", "Calculus", "limits", &[])]);

    assert_eq!(store.courses().len(), 1);
    assert!(store.get(&"CS101".into()).is_none());
}

#[test]
fn remove_of_unknown_course_is_a_no_op() {
    let mut store = store(vec![course("CS101", "Intro", "basics", &[])]);
    assert!(store.remove(&"NOPE".into()).is_none());
    assert_eq!(store.courses().len(), 1);
}

#[test]
fn dangling_prerequisites_are_omitted_from_titles() {
    let store = store(vec![
        course("CS101", "Intro", "basics", &[]),
        course("CS201", "Data Structures", "trees", &["CS101", "GONE1"]),
    ]);
    let dependent = store.get(&"CS201".into()).expect("course");
    assert_eq!(store.prerequisite_titles(dependent), vec!["Intro"]);
}
