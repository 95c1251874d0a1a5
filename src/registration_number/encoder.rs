//! Prefix encoding
//!
//! ```text
//! 3  01  07  2  1  001
//! │  │   │   │  │  └─ sequence (allocated per prefix)
//! │  │   │   │  └──── sex category
//! │  │   │   └─────── subject track
//! │  │   └─────────── grade level
//! │  └─────────────── institution
//! └────────────────── organization marker
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

use super::codes::{
    CodeTable, GradeLevel, Institution, ORGANIZATION_CODE, SexCategory, SubjectTrack,
};
use super::error::RegistrationNumberError;

/// Length of the encoded attribute prefix
pub const PREFIX_LEN: usize = 7;

/// Length of a full registration number
pub const NUMBER_LEN: usize = 10;

/// Width of the sequence suffix
pub const SEQUENCE_WIDTH: usize = 3;

/// Highest sequence a prefix can issue
pub const MAX_SEQUENCE: u32 = 999;

/// Attributes as submitted by the registration form
///
/// Values are labels (`"SCPSC"`, `"7"`, `"Math"`, `"male"`); they are only
/// trusted after [`RegistrationRequest::resolve`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationRequest {
    pub institution: String,
    pub grade_level: String,
    pub subject_track: String,
    pub sex_category: String,
}

impl RegistrationRequest {
    pub fn new(
        institution: impl Into<String>,
        grade_level: impl Into<String>,
        subject_track: impl Into<String>,
        sex_category: impl Into<String>,
    ) -> Self {
        Self {
            institution: institution.into(),
            grade_level: grade_level.into(),
            subject_track: subject_track.into(),
            sex_category: sex_category.into(),
        }
    }

    /// Map every field to its code table entry and check eligibility
    ///
    /// # Errors
    /// - `InvalidAttribute` for the first field without a code
    /// - `IneligibleCombination` when the subject is not offered for the grade
    pub fn resolve(&self) -> Result<RegistrationAttributes, RegistrationNumberError> {
        let institution = resolve_field::<Institution>(&self.institution)?;
        let grade_level = resolve_field::<GradeLevel>(&self.grade_level)?;
        let subject_track = resolve_field::<SubjectTrack>(&self.subject_track)?;
        let sex_category = resolve_field::<SexCategory>(&self.sex_category)?;

        if !subject_track.allows_grade(grade_level.number()) {
            return Err(RegistrationNumberError::IneligibleCombination {
                grade: grade_level.label().to_string(),
                subject: subject_track.label().to_string(),
            });
        }

        Ok(RegistrationAttributes {
            institution,
            grade_level,
            subject_track,
            sex_category,
        })
    }
}

fn resolve_field<T: CodeTable>(value: &str) -> Result<T, RegistrationNumberError> {
    T::from_label(value).ok_or_else(|| RegistrationNumberError::InvalidAttribute {
        field: T::FIELD,
        value: value.to_string(),
    })
}

/// Validated, eligible attribute set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RegistrationAttributes {
    pub institution: Institution,
    pub grade_level: GradeLevel,
    pub subject_track: SubjectTrack,
    pub sex_category: SexCategory,
}

impl RegistrationAttributes {
    /// The 7-character prefix shared by everyone in this category
    pub fn prefix(&self) -> String {
        let mut prefix = String::with_capacity(PREFIX_LEN);
        prefix.push_str(ORGANIZATION_CODE);
        prefix.push_str(self.institution.code());
        prefix.push_str(self.grade_level.code());
        prefix.push_str(self.subject_track.code());
        prefix.push_str(self.sex_category.code());
        prefix
    }
}

/// Encode a submitted request into its 7-character prefix
///
/// # Examples
/// ```
/// use olympiad_registration::registration_number::{RegistrationRequest, encode_prefix};
///
/// let req = RegistrationRequest::new("SCPSC", "7", "Math", "male");
/// assert_eq!(encode_prefix(&req).unwrap(), "3010721");
///
/// let req = RegistrationRequest::new("SCPSC", "6", "Physics", "male");
/// assert!(encode_prefix(&req).is_err());
/// ```
pub fn encode_prefix(request: &RegistrationRequest) -> Result<String, RegistrationNumberError> {
    Ok(request.resolve()?.prefix())
}

/// An issued 10-digit registration number
///
/// Only the allocator constructs these; stored numbers are handled as plain
/// strings and go through [`super::decoder::parse`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct RegistrationNumber(String);

impl RegistrationNumber {
    pub(crate) fn compose(prefix: &str, sequence: u32) -> Self {
        Self(format!("{prefix}{sequence:0width$}", width = SEQUENCE_WIDTH))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn prefix(&self) -> &str {
        &self.0[..PREFIX_LEN]
    }

    pub fn sequence(&self) -> &str {
        &self.0[PREFIX_LEN..]
    }
}

impl fmt::Display for RegistrationNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for RegistrationNumber {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
