//! Data models for olympiad registrations

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::registration_number::{ParsedRegistrationNumber, RegistrationRequest};

/// Admin review state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(i16)]
pub enum ApprovalStatus {
    Pending = 0,
    Approved = 1,
    Rejected = 2,
}

impl From<i16> for ApprovalStatus {
    fn from(v: i16) -> Self {
        match v {
            1 => ApprovalStatus::Approved,
            2 => ApprovalStatus::Rejected,
            _ => ApprovalStatus::Pending,
        }
    }
}

impl ApprovalStatus {
    pub fn id(self) -> i16 {
        self as i16
    }
}

/// Registration fee state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(i16)]
pub enum PaymentStatus {
    Unpaid = 0,
    Paid = 1,
}

impl From<i16> for PaymentStatus {
    fn from(v: i16) -> Self {
        match v {
            1 => PaymentStatus::Paid,
            _ => PaymentStatus::Unpaid,
        }
    }
}

impl PaymentStatus {
    pub fn id(self) -> i16 {
        self as i16
    }
}

/// Kind of uploaded media
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Photo,
    Signature,
}

impl MediaKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MediaKind::Photo => "photo",
            MediaKind::Signature => "signature",
        }
    }
}

/// Uploaded file as received from the form
#[derive(Debug, Clone)]
pub struct MediaUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Form submission for a new registration
#[derive(Debug, Clone)]
pub struct NewRegistration {
    pub student_name: String,
    pub father_name: String,
    pub mother_name: String,
    pub phone: String,
    pub email: Option<String>,
    pub attributes: RegistrationRequest,
    pub photo: Option<MediaUpload>,
    pub signature: Option<MediaUpload>,
}

/// Row to insert, with the allocated number and resolved media URLs
#[derive(Debug, Clone)]
pub struct RegistrationRecord {
    pub registration_number: String,
    pub student_name: String,
    pub father_name: String,
    pub mother_name: String,
    pub phone: String,
    pub email: Option<String>,
    pub institution: String,
    pub grade_level: String,
    pub subject_track: String,
    pub sex_category: String,
    pub photo_url: String,
    pub signature_url: String,
}

/// Stored registration
#[derive(Debug, Clone, Serialize)]
pub struct Registration {
    pub id: i64,
    pub registration_number: String,
    pub student_name: String,
    pub father_name: String,
    pub mother_name: String,
    pub phone: String,
    pub email: Option<String>,
    pub institution: String,
    pub grade_level: String,
    pub subject_track: String,
    pub sex_category: String,
    pub photo_url: String,
    pub signature_url: String,
    pub approval_status: ApprovalStatus,
    pub payment_status: PaymentStatus,
    pub payment_reference: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Registration {
    pub fn is_approved(&self) -> bool {
        self.approval_status == ApprovalStatus::Approved
    }

    pub fn is_paid(&self) -> bool {
        self.payment_status == PaymentStatus::Paid
    }
}

/// What the student profile page shows
#[derive(Debug, Clone, Serialize)]
pub struct RegistrationProfile {
    pub registration: Registration,
    /// `None` only for malformed numbers stored before validation existed
    pub decoded: Option<ParsedRegistrationNumber>,
}
