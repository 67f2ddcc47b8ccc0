//! Search and sort over the catalog as shown to the user.

use std::{cmp::Ordering, fmt, str::FromStr};

use catalog_shared::domain::Course;
use icu_collator::{Collator, CollatorOptions, Strength};
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    Title,
    CourseId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

/// Compound sort selector, written `title-asc`, `courseId-desc`, ...
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SortOption {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl SortOption {
    pub const ALL: [SortOption; 4] = [
        SortOption::new(SortKey::Title, SortDirection::Ascending),
        SortOption::new(SortKey::Title, SortDirection::Descending),
        SortOption::new(SortKey::CourseId, SortDirection::Ascending),
        SortOption::new(SortKey::CourseId, SortDirection::Descending),
    ];

    pub const fn new(key: SortKey, direction: SortDirection) -> Self {
        Self { key, direction }
    }

    pub fn label(self) -> &'static str {
        match (self.key, self.direction) {
            (SortKey::Title, SortDirection::Ascending) => "Title (A–Z)",
            (SortKey::Title, SortDirection::Descending) => "Title (Z–A)",
            (SortKey::CourseId, SortDirection::Ascending) => "Course ID (A–Z)",
            (SortKey::CourseId, SortDirection::Descending) => "Course ID (Z–A)",
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown sort option `{0}` (expected title-asc, title-desc, courseId-asc or courseId-desc)")]
pub struct UnknownSortOption(pub String);

impl FromStr for SortOption {
    type Err = UnknownSortOption;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let unknown = || UnknownSortOption(raw.to_string());
        let (field, dir) = raw.split_once('-').ok_or_else(unknown)?;
        let key = match field {
            "title" => SortKey::Title,
            "courseId" => SortKey::CourseId,
            _ => return Err(unknown()),
        };
        let direction = match dir {
            "asc" => SortDirection::Ascending,
            "desc" => SortDirection::Descending,
            _ => return Err(unknown()),
        };
        Ok(Self { key, direction })
    }
}

impl fmt::Display for SortOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let field = match self.key {
            SortKey::Title => "title",
            SortKey::CourseId => "courseId",
        };
        let dir = match self.direction {
            SortDirection::Ascending => "asc",
            SortDirection::Descending => "desc",
        };
        write!(f, "{field}-{dir}")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewQuery {
    pub search: String,
    pub sort: SortOption,
}

impl ViewQuery {
    pub fn new(search: impl Into<String>, sort: SortOption) -> Self {
        Self {
            search: search.into(),
            sort,
        }
    }
}

pub fn matches_search(course: &Course, needle_lower: &str) -> bool {
    needle_lower.is_empty()
        || course.title.to_lowercase().contains(needle_lower)
        || course.course_id.as_str().to_lowercase().contains(needle_lower)
        || course.description.to_lowercase().contains(needle_lower)
}

/// Filters and orders `courses` for display. Pure; equal sort keys keep
/// their input order in both directions.
pub fn project<'a>(courses: &'a [Course], query: &ViewQuery) -> Vec<&'a Course> {
    let needle = query.search.to_lowercase();
    let mut visible: Vec<&Course> = courses
        .iter()
        .filter(|c| matches_search(c, &needle))
        .collect();

    visible.sort_by(|a, b| {
        let (a, b) = (sort_field(a, query.sort.key), sort_field(b, query.sort.key));
        match query.sort.direction {
            SortDirection::Ascending => locale_cmp(a, b),
            SortDirection::Descending => locale_cmp(b, a),
        }
    });
    visible
}

fn sort_field(course: &Course, key: SortKey) -> &str {
    match key {
        SortKey::Title => &course.title,
        SortKey::CourseId => course.course_id.as_str(),
    }
}

thread_local! {
    static ROOT_COLLATOR: Option<Collator> = root_collator();
}

fn root_collator() -> Option<Collator> {
    let mut options = CollatorOptions::new();
    options.strength = Some(Strength::Tertiary);
    match Collator::try_new(&Default::default(), options) {
        Ok(collator) => Some(collator),
        Err(err) => {
            warn!("catalog: root collator unavailable, sorting by folded case: {err}");
            None
        }
    }
}

/// Root-locale collation at tertiary strength, the order a default
/// `localeCompare` gives: accents and punctuation are weighed below base
/// letters, and lowercase sorts before uppercase on otherwise equal text.
pub fn locale_cmp(a: &str, b: &str) -> Ordering {
    ROOT_COLLATOR.with(|collator| match collator {
        Some(collator) => collator.compare(a, b),
        None => folded_cmp(a, b),
    })
}

fn folded_cmp(a: &str, b: &str) -> Ordering {
    let primary = a
        .chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase));
    if primary != Ordering::Equal {
        return primary;
    }
    for (x, y) in a.chars().zip(b.chars()) {
        if x != y {
            return match (x.is_lowercase(), y.is_lowercase()) {
                (true, false) => Ordering::Less,
                (false, true) => Ordering::Greater,
                _ => x.cmp(&y),
            };
        }
    }
    a.len().cmp(&b.len())
}

#[cfg(test)]
#[path = "tests/projection_tests.rs"]
mod tests;
