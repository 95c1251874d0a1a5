//! Closed code tables shared by the encoder and the decoder
//!
//! Every attribute that appears inside a registration number is a closed
//! enumeration. Each enum carries exactly one table of `(variant, label, code)`
//! entries; label/code lookups in both directions are derived from that table.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Organization marker at position 0 of every registration number
pub const ORGANIZATION_CODE: &str = "3";

/// Display name for [`ORGANIZATION_CODE`]
pub const ORGANIZATION_NAME: &str = "Savar Science Society";

/// Label used by the decoder for codes with no table entry
pub const UNKNOWN_LABEL: &str = "Unknown";

// ============================================================================
// Code table trait
// ============================================================================

/// One row of a code table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodeEntry<T: 'static> {
    pub value: T,
    pub label: &'static str,
    pub code: &'static str,
}

/// A closed enumeration with a fixed-width numeric code per variant
///
/// `ENTRIES` must list every variant exactly once, in declaration order, so that
/// `ENTRIES[v.ordinal()].value == v`.
pub trait CodeTable: Copy + PartialEq + 'static {
    /// Field name used in error messages
    const FIELD: &'static str;
    /// Width of the encoded field inside a registration number
    const WIDTH: usize;
    /// The table itself
    const ENTRIES: &'static [CodeEntry<Self>];

    /// Position of this variant in `ENTRIES`
    fn ordinal(self) -> usize;

    fn code(self) -> &'static str {
        Self::ENTRIES[self.ordinal()].code
    }

    fn label(self) -> &'static str {
        Self::ENTRIES[self.ordinal()].label
    }

    /// Resolve a submitted label (surrounding whitespace ignored)
    fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::ENTRIES
            .iter()
            .find(|e| e.label == label)
            .map(|e| e.value)
    }

    /// Resolve an encoded field
    fn from_code(code: &str) -> Option<Self> {
        Self::ENTRIES.iter().find(|e| e.code == code).map(|e| e.value)
    }

    /// Label for an encoded field, or [`UNKNOWN_LABEL`]
    fn label_for_code(code: &str) -> &'static str {
        Self::from_code(code).map_or(UNKNOWN_LABEL, Self::label)
    }

    fn all() -> impl Iterator<Item = Self> {
        Self::ENTRIES.iter().map(|e| e.value)
    }
}

// ============================================================================
// Institution
// ============================================================================

/// Participating institution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Institution {
    Scpsc,
    Smhs,
    Bpatc,
    Gbs,
    /// Any other school
    Other,
}

impl CodeTable for Institution {
    const FIELD: &'static str = "institution";
    const WIDTH: usize = 2;
    const ENTRIES: &'static [CodeEntry<Self>] = &[
        CodeEntry { value: Self::Scpsc, label: "SCPSC", code: "01" },
        CodeEntry { value: Self::Smhs, label: "SMHS", code: "02" },
        CodeEntry { value: Self::Bpatc, label: "BPATC", code: "03" },
        CodeEntry { value: Self::Gbs, label: "GBS", code: "04" },
        CodeEntry { value: Self::Other, label: "Other", code: "05" },
    ];

    fn ordinal(self) -> usize {
        self as usize
    }
}

// ============================================================================
// GradeLevel
// ============================================================================

/// School grade (class 5 through class 10)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum GradeLevel {
    Five,
    Six,
    Seven,
    Eight,
    Nine,
    Ten,
}

impl GradeLevel {
    /// Numeric grade, used by the eligibility table
    pub fn number(self) -> u8 {
        self as u8 + 5
    }
}

impl CodeTable for GradeLevel {
    const FIELD: &'static str = "grade_level";
    const WIDTH: usize = 2;
    const ENTRIES: &'static [CodeEntry<Self>] = &[
        CodeEntry { value: Self::Five, label: "5", code: "05" },
        CodeEntry { value: Self::Six, label: "6", code: "06" },
        CodeEntry { value: Self::Seven, label: "7", code: "07" },
        CodeEntry { value: Self::Eight, label: "8", code: "08" },
        CodeEntry { value: Self::Nine, label: "9", code: "09" },
        CodeEntry { value: Self::Ten, label: "10", code: "10" },
    ];

    fn ordinal(self) -> usize {
        self as usize
    }
}

// ============================================================================
// SubjectTrack
// ============================================================================

/// Olympiad subject track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SubjectTrack {
    Science,
    Math,
    Physics,
}

impl CodeTable for SubjectTrack {
    const FIELD: &'static str = "subject_track";
    const WIDTH: usize = 1;
    const ENTRIES: &'static [CodeEntry<Self>] = &[
        CodeEntry { value: Self::Science, label: "Science", code: "1" },
        CodeEntry { value: Self::Math, label: "Math", code: "2" },
        CodeEntry { value: Self::Physics, label: "Physics", code: "3" },
    ];

    fn ordinal(self) -> usize {
        self as usize
    }
}

// ============================================================================
// SexCategory
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SexCategory {
    Male,
    Female,
}

impl CodeTable for SexCategory {
    const FIELD: &'static str = "sex_category";
    const WIDTH: usize = 1;
    const ENTRIES: &'static [CodeEntry<Self>] = &[
        CodeEntry { value: Self::Male, label: "male", code: "1" },
        CodeEntry { value: Self::Female, label: "female", code: "2" },
    ];

    fn ordinal(self) -> usize {
        self as usize
    }
}

macro_rules! display_label {
    ($($ty:ty),*) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        })*
    };
}

display_label!(Institution, GradeLevel, SubjectTrack, SexCategory);

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_table_consistent<T: CodeTable + fmt::Debug>() {
        for (i, entry) in T::ENTRIES.iter().enumerate() {
            assert_eq!(entry.value.ordinal(), i, "{} table out of order", T::FIELD);
            assert_eq!(entry.code.len(), T::WIDTH, "{} code width", T::FIELD);
            assert!(entry.code.chars().all(|c| c.is_ascii_digit()));
            assert_eq!(T::from_code(entry.code), Some(entry.value));
            assert_eq!(T::from_label(entry.label), Some(entry.value));
        }
    }

    #[test]
    fn test_tables_are_consistent() {
        assert_table_consistent::<Institution>();
        assert_table_consistent::<GradeLevel>();
        assert_table_consistent::<SubjectTrack>();
        assert_table_consistent::<SexCategory>();
    }

    #[test]
    fn test_codes_are_unique() {
        let codes: Vec<&str> = Institution::ENTRIES.iter().map(|e| e.code).collect();
        let mut dedup = codes.clone();
        dedup.sort();
        dedup.dedup();
        assert_eq!(codes.len(), dedup.len());
    }

    #[test]
    fn test_known_codes() {
        assert_eq!(Institution::Scpsc.code(), "01");
        assert_eq!(Institution::Bpatc.code(), "03");
        assert_eq!(Institution::Gbs.code(), "04");
        assert_eq!(GradeLevel::Ten.code(), "10");
        assert_eq!(GradeLevel::Seven.number(), 7);
        assert_eq!(SubjectTrack::Physics.code(), "3");
        assert_eq!(SexCategory::Female.code(), "2");
    }

    #[test]
    fn test_label_lookup_trims_and_is_exact() {
        assert_eq!(Institution::from_label("  GBS "), Some(Institution::Gbs));
        assert_eq!(Institution::from_label("gbs"), None);
        assert_eq!(GradeLevel::from_label("05"), None);
        assert_eq!(SubjectTrack::from_label("Chemistry"), None);
    }

    #[test]
    fn test_unknown_code_label() {
        assert_eq!(Institution::label_for_code("99"), UNKNOWN_LABEL);
        assert_eq!(SexCategory::label_for_code("1"), "male");
        assert_eq!(GradeLevel::label_for_code("5"), UNKNOWN_LABEL);
    }

    #[test]
    fn test_display_uses_label() {
        assert_eq!(Institution::Scpsc.to_string(), "SCPSC");
        assert_eq!(GradeLevel::Nine.to_string(), "9");
    }
}
