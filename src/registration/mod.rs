//! Olympiad registration workflow
//!
//! PostgreSQL-backed storage for registrations, media uploads, admin review
//! and payment tracking. Number allocation is delegated to
//! [`crate::registration_number`].

pub mod error;
pub mod media;
pub mod models;
pub mod repository;
pub mod service;

// Re-export commonly used types
pub use error::RegistrationError;
pub use media::{LocalMediaStore, MediaError, MediaStore};
pub use models::{
    ApprovalStatus, MediaKind, MediaUpload, NewRegistration, PaymentStatus, Registration,
    RegistrationProfile,
};
pub use repository::{PgRegistrationRepository, RegistrationStore};
pub use service::RegistrationService;
