//! Registration number decoding for display

use serde::Serialize;

use super::codes::{
    CodeTable, GradeLevel, Institution, ORGANIZATION_CODE, ORGANIZATION_NAME, SexCategory,
    SubjectTrack, UNKNOWN_LABEL,
};
use super::encoder::{NUMBER_LEN, PREFIX_LEN};

/// Human-readable view of a registration number
///
/// Fields whose code has no table entry carry the label `"Unknown"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedRegistrationNumber {
    pub organization: String,
    pub institution: String,
    pub grade_level: String,
    pub subject_track: String,
    pub sex_category: String,
    pub sequence: String,
}

/// Decode a stored registration number
///
/// Returns `None` unless the input is exactly 10 characters long. Fields are
/// taken by character position, so non-digit characters only turn their own
/// field into `"Unknown"`.
///
/// # Examples
/// ```
/// use olympiad_registration::registration_number::parse;
///
/// let parsed = parse("3010721001").unwrap();
/// assert_eq!(parsed.institution, "SCPSC");
/// assert_eq!(parsed.sequence, "001");
///
/// assert!(parse("30103210").is_none());
/// ```
pub fn parse(registration_number: &str) -> Option<ParsedRegistrationNumber> {
    let chars: Vec<char> = registration_number.chars().collect();
    if chars.len() != NUMBER_LEN {
        return None;
    }

    let field =
        |start: usize, width: usize| -> String { chars[start..start + width].iter().collect() };

    let organization = if field(0, 1) == ORGANIZATION_CODE {
        ORGANIZATION_NAME
    } else {
        UNKNOWN_LABEL
    };

    let mut offset = 1;
    let institution = Institution::label_for_code(&field(offset, Institution::WIDTH));
    offset += Institution::WIDTH;
    let grade_level = GradeLevel::label_for_code(&field(offset, GradeLevel::WIDTH));
    offset += GradeLevel::WIDTH;
    let subject_track = SubjectTrack::label_for_code(&field(offset, SubjectTrack::WIDTH));
    offset += SubjectTrack::WIDTH;
    let sex_category = SexCategory::label_for_code(&field(offset, SexCategory::WIDTH));

    Some(ParsedRegistrationNumber {
        organization: organization.to_string(),
        institution: institution.to_string(),
        grade_level: grade_level.to_string(),
        subject_track: subject_track.to_string(),
        sex_category: sex_category.to_string(),
        sequence: field(PREFIX_LEN, NUMBER_LEN - PREFIX_LEN),
    })
}
