use super::*;
use crate::{
    instance_store::{INSTANCE_ADD_FAILED, INSTANCE_ALREADY_EXISTS},
    test_support::{course, scope, semester},
};

fn filled_create_session() -> EditSession<CourseForm> {
    let mut session = EditSession::<CourseForm>::create();
    session.set_title("Intro").unwrap();
    session.set_course_id("CS101").unwrap();
    session.set_description("basics").unwrap();
    session.set_academic_year("2025").unwrap();
    session.set_semester(Some(semester(1))).unwrap();
    session
}

#[test]
fn create_submission_carries_typed_course() {
    let mut session = filled_create_session();
    session.select_prerequisites(["MA101"]).unwrap();

    let submission = session.begin_submit().unwrap();
    assert_eq!(submission.mode, EditMode::Create);
    assert_eq!(submission.course.course_id, CourseId::from("CS101"));
    assert_eq!(submission.course.academic_year, 2025);
    assert_eq!(
        submission.course.prerequisite_ids,
        Some(vec![CourseId::from("MA101")])
    );
    assert!(session.is_submitting());
}

#[test]
fn missing_field_keeps_session_in_draft() {
    let mut session = filled_create_session();
    session.set_description("").unwrap();

    assert_eq!(
        session.begin_submit(),
        Err(EditError::MissingField("description"))
    );
    assert_eq!(session.state(), &SessionState::Draft);
}

#[test]
fn unparsable_year_is_refused_locally() {
    let mut session = filled_create_session();
    session.set_academic_year("twenty").unwrap();

    assert!(matches!(
        session.begin_submit(),
        Err(EditError::InvalidNumber { field: "academicYear", .. })
    ));
    assert_eq!(session.state(), &SessionState::Draft);
}

#[test]
fn edit_mode_fixes_the_course_id() {
    let existing = course("CS201", "Data Structures", "trees", &["CS101"]);
    let mut session = EditSession::<CourseForm>::edit(&existing);

    assert_eq!(session.form().prerequisite_ids(), &[CourseId::from("CS101")]);
    assert_eq!(
        session.set_course_id("CS999"),
        Err(EditError::ImmutableCourseId("CS201".into()))
    );
    session.set_title("Data Structures II").unwrap();

    let submission = session.begin_submit().unwrap();
    assert_eq!(
        submission.mode,
        EditMode::Edit {
            course_id: "CS201".into()
        }
    );
    assert_eq!(submission.course.course_id, CourseId::from("CS201"));
    assert_eq!(submission.course.title, "Data Structures II");
}

#[test]
fn none_entry_is_dropped_from_prerequisites() {
    let mut session = filled_create_session();
    session
        .select_prerequisites(["-", "CS100", "MA101", "CS100"])
        .unwrap();
    assert_eq!(
        session.form().prerequisite_ids(),
        &[CourseId::from("CS100"), CourseId::from("MA101")]
    );

    session.select_prerequisites([NO_PREREQUISITE]).unwrap();
    assert!(session.form().prerequisite_ids().is_empty());
}

#[test]
fn second_submit_while_in_flight_is_refused() {
    let mut session = filled_create_session();
    session.begin_submit().unwrap();

    assert_eq!(session.begin_submit(), Err(EditError::AlreadySubmitting));
    assert_eq!(session.set_title("x"), Err(EditError::AlreadySubmitting));
    assert_eq!(session.cancel(), Err(EditError::AlreadySubmitting));
}

#[test]
fn success_closes_and_resets_the_form() {
    let mut session = filled_create_session();
    session.begin_submit().unwrap();

    assert_eq!(session.finish(Ok(())), Ok(&SessionState::Closed));
    assert_eq!(session.form(), &CourseForm::default());
    assert_eq!(session.begin_submit(), Err(EditError::Closed));
}

#[test]
fn failure_keeps_draft_and_allows_retry() {
    let mut session = filled_create_session();
    session.begin_submit().unwrap();
    session
        .finish(Err(ServiceError::transport("connection refused")))
        .unwrap();

    assert_eq!(session.error_message(), Some(COURSE_ADD_FAILED));
    assert_eq!(session.form().title, "Intro");
    assert!(session.begin_submit().is_ok());
}

#[test]
fn validation_rejection_is_shown_verbatim() {
    let existing = course("CS201", "Data Structures", "trees", &[]);
    let mut session = EditSession::<CourseForm>::edit(&existing);
    session.begin_submit().unwrap();
    session
        .finish(Err(ServiceError::ValidationRejected(
            "Title must be unique".into(),
        )))
        .unwrap();
    assert_eq!(session.error_message(), Some("Title must be unique"));

    session.begin_submit().unwrap();
    session
        .finish(Err(ServiceError::Server {
            status: 500,
            message: "boom".into(),
        }))
        .unwrap();
    assert_eq!(session.error_message(), Some(COURSE_UPDATE_FAILED));
}

#[test]
fn finish_without_submit_is_refused() {
    let mut session = filled_create_session();
    assert_eq!(session.finish(Ok(())), Err(EditError::NotSubmitting));
}

#[test]
fn instance_form_prefills_loaded_scope() {
    let mut session = EditSession::<InstanceForm>::for_scope(Some(scope(2025, 2)));
    assert_eq!(session.begin_submit(), Err(EditError::MissingField("courseId")));

    session.select_course("CS101").unwrap();
    let submission = session.begin_submit().unwrap();
    assert_eq!(
        submission,
        InstanceSubmission {
            scope: scope(2025, 2),
            course_id: "CS101".into(),
        }
    );
}

#[test]
fn instance_form_requires_a_scope() {
    let mut session = EditSession::<InstanceForm>::for_scope(None);
    session.select_course("CS101").unwrap();
    assert_eq!(
        session.begin_submit(),
        Err(EditError::MissingField("academicYear"))
    );

    session.set_scope(Some(2026), None).unwrap();
    assert_eq!(session.begin_submit(), Err(EditError::MissingField("semester")));
}

#[test]
fn instance_failures_map_to_add_messages() {
    let mut session = EditSession::<InstanceForm>::for_scope(Some(scope(2025, 1)));
    session.select_course("CS101").unwrap();

    session.begin_submit().unwrap();
    session.finish(Err(ServiceError::DuplicateKey)).unwrap();
    assert_eq!(session.error_message(), Some(INSTANCE_ALREADY_EXISTS));

    session.begin_submit().unwrap();
    session
        .finish(Err(ServiceError::transport("timed out")))
        .unwrap();
    assert_eq!(session.error_message(), Some(INSTANCE_ADD_FAILED));
}
