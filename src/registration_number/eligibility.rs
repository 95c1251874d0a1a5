//! Grade/subject eligibility table
//!
//! Both public functions are derived from [`ELIGIBILITY`], so a subject is
//! listed by [`available_subjects`] exactly when [`is_subject_allowed_for_grade`]
//! accepts it.

use super::codes::{CodeTable, SubjectTrack};

/// Inclusive grade range offered for each subject track
pub const ELIGIBILITY: &[(SubjectTrack, u8, u8)] = &[
    (SubjectTrack::Science, 5, 8),
    (SubjectTrack::Math, 5, 10),
    (SubjectTrack::Physics, 9, 10),
];

impl SubjectTrack {
    /// Whether this track is offered at the given numeric grade
    pub fn allows_grade(self, grade: u8) -> bool {
        ELIGIBILITY
            .iter()
            .any(|&(subject, min, max)| subject == self && (min..=max).contains(&grade))
    }
}

fn parse_grade(grade_level: &str) -> Option<u8> {
    grade_level.trim().parse().ok()
}

/// Check a submitted grade/subject pair
///
/// Unparseable grades and unknown subjects are simply not allowed.
pub fn is_subject_allowed_for_grade(grade_level: &str, subject_track: &str) -> bool {
    match (parse_grade(grade_level), SubjectTrack::from_label(subject_track)) {
        (Some(grade), Some(subject)) => subject.allows_grade(grade),
        _ => false,
    }
}

/// Subject tracks selectable for a grade, in table order
pub fn available_subjects(grade_level: &str) -> Vec<SubjectTrack> {
    let Some(grade) = parse_grade(grade_level) else {
        return Vec::new();
    };
    SubjectTrack::all().filter(|s| s.allows_grade(grade)).collect()
}
