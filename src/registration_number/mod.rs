//! Registration Number Engine
//!
//! Encodes a registrant's institution, grade, subject and sex category into a
//! 7-digit prefix, allocates a 3-digit sequence per prefix and decodes issued
//! numbers back into labels.
//!
//! | Position | Width | Field          |
//! |----------|-------|----------------|
//! | 0        | 1     | organization   |
//! | 1-2      | 2     | institution    |
//! | 3-4      | 2     | grade level    |
//! | 5        | 1     | subject track  |
//! | 6        | 1     | sex category   |
//! | 7-9      | 3     | sequence       |
//!
//! The module holds no state. The only I/O is the injected [`SequenceLookup`].

pub mod allocator;
pub mod codes;
pub mod decoder;
pub mod eligibility;
pub mod encoder;
pub mod error;

pub use allocator::{SequenceLookup, allocate_number};
pub use codes::{CodeTable, GradeLevel, Institution, SexCategory, SubjectTrack};
pub use decoder::{ParsedRegistrationNumber, parse};
pub use eligibility::{available_subjects, is_subject_allowed_for_grade};
pub use encoder::{
    MAX_SEQUENCE, RegistrationAttributes, RegistrationNumber, RegistrationRequest, encode_prefix,
};
pub use error::RegistrationNumberError;
