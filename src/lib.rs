//! Olympiad Registration - Savar Science Society
//!
//! Backend for the school olympiad registration site.
//!
//! # Modules
//!
//! - [`registration_number`] - Registration number encoding, allocation and decoding
//! - [`registration`] - Registration workflow, PostgreSQL store, media uploads
//! - [`db`] - Connection pool and store errors
//! - [`config`] - YAML configuration
//! - [`logging`] - Tracing subscriber setup

// Registration number engine - no I/O of its own
pub mod registration_number;

// Workflow and persistence
pub mod db;
pub mod registration;

// Ambient
pub mod config;
pub mod logging;

// Convenient re-exports at crate root
pub use db::{Database, StoreError};
pub use registration::{RegistrationError, RegistrationService};
pub use registration_number::{
    ParsedRegistrationNumber, RegistrationNumber, RegistrationNumberError, RegistrationRequest,
    SequenceLookup, allocate_number, available_subjects, encode_prefix,
    is_subject_allowed_for_grade, parse,
};
