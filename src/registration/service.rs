//! Registration workflow
//!
//! # Allocation
//!
//! ```text
//! lookup last sequence ─▶ compute next ─▶ insert ──ok──▶ done
//!          ▲                                  │
//!          └──────── Duplicate (lost race) ◀──┘   (bounded by max_allocation_attempts)
//! ```
//!
//! Nothing serializes concurrent registrations for the same prefix. The unique
//! index on `registration_number` detects the collision and the loser starts
//! over with a fresh lookup.

use chrono::Utc;
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;

use super::error::RegistrationError;
use super::media::MediaStore;
use super::models::{
    ApprovalStatus, MediaKind, MediaUpload, NewRegistration, Registration, RegistrationProfile,
    RegistrationRecord,
};
use super::repository::RegistrationStore;
use crate::config::RegistrationConfig;
use crate::registration_number::{CodeTable, allocate_number, parse};

pub struct RegistrationService {
    store: Arc<dyn RegistrationStore>,
    media: Arc<dyn MediaStore>,
    config: RegistrationConfig,
}

impl RegistrationService {
    pub fn new(
        store: Arc<dyn RegistrationStore>,
        media: Arc<dyn MediaStore>,
        config: RegistrationConfig,
    ) -> Self {
        Self {
            store,
            media,
            config,
        }
    }

    /// Register a student and issue their registration number
    ///
    /// Attributes are validated before any upload or lookup happens. Media
    /// failures never fail the registration.
    pub async fn register(&self, form: NewRegistration) -> Result<Registration, RegistrationError> {
        validate_form(&form)?;
        let attributes = form.attributes.resolve()?;
        let prefix = attributes.prefix();

        let media_key = media_key(&form.phone);
        let photo_url = self
            .store_media(MediaKind::Photo, &media_key, form.photo.as_ref())
            .await;
        let signature_url = self
            .store_media(MediaKind::Signature, &media_key, form.signature.as_ref())
            .await;

        let mut record = RegistrationRecord {
            registration_number: String::new(),
            student_name: form.student_name.trim().to_string(),
            father_name: form.father_name.trim().to_string(),
            mother_name: form.mother_name.trim().to_string(),
            phone: form.phone.trim().to_string(),
            email: form
                .email
                .as_deref()
                .map(str::trim)
                .filter(|e| !e.is_empty())
                .map(str::to_string),
            institution: attributes.institution.label().to_string(),
            grade_level: attributes.grade_level.label().to_string(),
            subject_track: attributes.subject_track.label().to_string(),
            sex_category: attributes.sex_category.label().to_string(),
            photo_url,
            signature_url,
        };

        let max_attempts = self.config.max_allocation_attempts.max(1);
        for attempt in 1..=max_attempts {
            let number = allocate_number(&form.attributes, self.store.as_ref()).await?;
            record.registration_number = number.into_string();

            match self.store.insert(&record).await {
                Ok(registration) => {
                    tracing::info!(
                        registration_number = %registration.registration_number,
                        attempt,
                        "Registration created"
                    );
                    return Ok(registration);
                }
                Err(e) if e.is_duplicate() => {
                    tracing::warn!(
                        registration_number = %record.registration_number,
                        attempt,
                        max_attempts,
                        "Registration number taken concurrently, reallocating"
                    );
                    if attempt < max_attempts && self.config.retry_backoff_ms > 0 {
                        let delay = retry_delay(self.config.retry_backoff_ms, attempt);
                        tokio::time::sleep(delay).await;
                    }
                }
                Err(e) => return Err(e.into()),
            }
        }

        tracing::error!(
            prefix = %prefix,
            attempts = max_attempts,
            "Gave up allocating a registration number"
        );
        Err(RegistrationError::AllocationConflict {
            attempts: max_attempts,
        })
    }

    async fn store_media(&self, kind: MediaKind, key: &str, upload: Option<&MediaUpload>) -> String {
        let placeholder = match kind {
            MediaKind::Photo => &self.config.placeholder_photo_url,
            MediaKind::Signature => &self.config.placeholder_signature_url,
        };
        let Some(upload) = upload else {
            return placeholder.clone();
        };

        match self
            .media
            .upload(kind, key, &upload.file_name, &upload.bytes)
            .await
        {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!(kind = kind.as_str(), error = %e, "Media upload failed, using placeholder");
                placeholder.clone()
            }
        }
    }

    pub async fn approve(&self, number: &str) -> Result<Registration, RegistrationError> {
        self.set_status(number, ApprovalStatus::Approved).await
    }

    pub async fn reject(&self, number: &str) -> Result<Registration, RegistrationError> {
        self.set_status(number, ApprovalStatus::Rejected).await
    }

    async fn set_status(
        &self,
        number: &str,
        status: ApprovalStatus,
    ) -> Result<Registration, RegistrationError> {
        let registration = self.store.set_approval_status(number.trim(), status).await?;
        tracing::info!(registration_number = %number, status = ?status, "Approval status changed");
        Ok(registration)
    }

    /// Mark the registration fee as paid
    pub async fn record_payment(
        &self,
        number: &str,
        reference: &str,
    ) -> Result<Registration, RegistrationError> {
        let reference = reference.trim();
        if reference.is_empty() {
            return Err(RegistrationError::InvalidField {
                field: "payment_reference",
                reason: "must not be empty",
            });
        }
        let registration = self.store.record_payment(number.trim(), reference).await?;
        tracing::info!(registration_number = %number, reference, "Payment recorded");
        Ok(registration)
    }

    /// Load a registration with its decoded number
    pub async fn profile(&self, number: &str) -> Result<RegistrationProfile, RegistrationError> {
        let number = number.trim();
        let registration = self
            .store
            .get_by_number(number)
            .await?
            .ok_or_else(|| RegistrationError::NotFound(number.to_string()))?;
        let decoded = parse(&registration.registration_number);
        Ok(RegistrationProfile {
            registration,
            decoded,
        })
    }
}

fn validate_form(form: &NewRegistration) -> Result<(), RegistrationError> {
    let required = [
        ("student_name", &form.student_name),
        ("father_name", &form.father_name),
        ("mother_name", &form.mother_name),
        ("phone", &form.phone),
    ];
    for (field, value) in required {
        if value.trim().is_empty() {
            return Err(RegistrationError::InvalidField {
                field,
                reason: "must not be empty",
            });
        }
    }

    let phone = form.phone.trim();
    let digits = phone.strip_prefix('+').unwrap_or(phone);
    if !digits.chars().all(|c| c.is_ascii_digit()) || !(10..=14).contains(&digits.len()) {
        return Err(RegistrationError::InvalidField {
            field: "phone",
            reason: "expected 10-14 digits",
        });
    }
    Ok(())
}

/// Delay before retry `attempt + 1`
///
/// Linear in the attempt number plus up to one `base_ms` of random jitter.
fn retry_delay(base_ms: u64, attempt: u32) -> Duration {
    let jitter = rand::thread_rng().gen_range(0..=base_ms);
    Duration::from_millis(base_ms.saturating_mul(u64::from(attempt)).saturating_add(jitter))
}

/// Upload key, independent of the not-yet-allocated registration number
fn media_key(phone: &str) -> String {
    let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();
    let nonce: u32 = rand::random();
    format!("{}-{}-{:08x}", Utc::now().timestamp_millis(), digits, nonce)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registration::media::mock::MemoryMediaStore;
    use crate::registration::models::PaymentStatus;
    use crate::registration::repository::mock::InMemoryStore;
    use crate::registration_number::{RegistrationNumberError, RegistrationRequest};

    fn config() -> RegistrationConfig {
        RegistrationConfig {
            retry_backoff_ms: 0,
            ..RegistrationConfig::default()
        }
    }

    fn service_with(store: Arc<InMemoryStore>, media: Arc<MemoryMediaStore>) -> RegistrationService {
        RegistrationService::new(store, media, config())
    }

    fn form(institution: &str, grade: &str, subject: &str, sex: &str) -> NewRegistration {
        NewRegistration {
            student_name: "Tanvir Hasan".into(),
            father_name: "Mizanur Rahman".into(),
            mother_name: "Salma Akter".into(),
            phone: "01711223344".into(),
            email: Some("  ".into()),
            attributes: RegistrationRequest::new(institution, grade, subject, sex),
            photo: Some(MediaUpload {
                file_name: "photo.jpg".into(),
                bytes: vec![1, 2, 3],
            }),
            signature: None,
        }
    }

    #[tokio::test]
    async fn test_sequential_registrations_share_prefix() {
        let store = Arc::new(InMemoryStore::new());
        let service = service_with(store.clone(), Arc::new(MemoryMediaStore::new()));

        let first = service.register(form("SCPSC", "7", "Math", "male")).await.unwrap();
        let second = service.register(form("SCPSC", "7", "Math", "male")).await.unwrap();
        let other = service.register(form("BPATC", "8", "Science", "female")).await.unwrap();

        assert_eq!(first.registration_number, "3010721001");
        assert_eq!(second.registration_number, "3010721002");
        assert_eq!(other.registration_number, "3030812001");
        assert_eq!(first.approval_status, ApprovalStatus::Pending);
        assert_eq!(first.email, None);
        assert_eq!(store.len(), 3);
    }

    #[tokio::test]
    async fn test_lost_race_is_retried() {
        let store = Arc::new(InMemoryStore::new());
        store.lose_races(2);
        let service = service_with(store.clone(), Arc::new(MemoryMediaStore::new()));

        let registration = service.register(form("GBS", "10", "Physics", "male")).await.unwrap();

        // 001 and 002 went to concurrent registrants
        assert_eq!(registration.registration_number, "3041031003");
        assert_eq!(store.insert_attempts(), 3);
    }

    #[tokio::test]
    async fn test_retry_budget_is_bounded() {
        let store = Arc::new(InMemoryStore::new());
        store.lose_races(10);
        let service = service_with(store.clone(), Arc::new(MemoryMediaStore::new()));

        let err = service
            .register(form("GBS", "10", "Physics", "male"))
            .await
            .unwrap_err();

        assert_eq!(err, RegistrationError::AllocationConflict { attempts: 5 });
        assert_eq!(store.insert_attempts(), 5);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_registrations_get_dense_numbers() {
        const REGISTRANTS: u32 = 8;

        let store = Arc::new(InMemoryStore::new());
        store.set_lookup_delay(Duration::from_millis(5));
        let config = RegistrationConfig {
            max_allocation_attempts: REGISTRANTS,
            retry_backoff_ms: 2,
            ..RegistrationConfig::default()
        };
        let service = Arc::new(RegistrationService::new(
            store.clone(),
            Arc::new(MemoryMediaStore::new()),
            config,
        ));

        let handles: Vec<_> = (0..REGISTRANTS)
            .map(|_| {
                let service = service.clone();
                tokio::spawn(async move {
                    service.register(form("SCPSC", "7", "Math", "male")).await
                })
            })
            .collect();

        let mut numbers = Vec::new();
        for handle in handles {
            numbers.push(handle.await.unwrap().unwrap().registration_number);
        }
        numbers.sort();

        let expected: Vec<String> = (1..=REGISTRANTS).map(|n| format!("3010721{:03}", n)).collect();
        assert_eq!(numbers, expected);
        assert_eq!(store.len(), REGISTRANTS as usize);
    }

    #[test]
    fn test_retry_delay_grows_with_jitter() {
        for attempt in 1..=4 {
            let delay = retry_delay(10, attempt).as_millis() as u64;
            let floor = 10 * u64::from(attempt);
            assert!((floor..=floor + 10).contains(&delay), "attempt {attempt}: {delay}ms");
        }
        assert_eq!(retry_delay(0, 3), Duration::ZERO);
    }

    #[test]
    fn test_retry_delay_saturates() {
        assert_eq!(retry_delay(u64::MAX, 7), Duration::from_millis(u64::MAX));
    }

    #[test]
    fn test_media_keys_are_distinct() {
        let a = media_key("+880 1711-223344");
        let b = media_key("+880 1711-223344");
        assert_ne!(a, b);
        assert!(a.contains("-8801711223344-"));
    }

    #[tokio::test]
    async fn test_ineligible_combination_is_rejected_before_side_effects() {
        let store = Arc::new(InMemoryStore::new());
        let media = Arc::new(MemoryMediaStore::new());
        let service = service_with(store.clone(), media.clone());

        let err = service
            .register(form("SCPSC", "6", "Physics", "male"))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            RegistrationError::Number(RegistrationNumberError::IneligibleCombination { .. })
        ));
        assert_eq!(media.uploads(), 0);
        assert_eq!(store.insert_attempts(), 0);
    }

    #[tokio::test]
    async fn test_lookup_failure_allocates_first_sequence() {
        let store = Arc::new(InMemoryStore::new());
        let service = service_with(store.clone(), Arc::new(MemoryMediaStore::new()));
        service.register(form("SCPSC", "7", "Math", "male")).await.unwrap();

        store.set_fail_lookups(true);
        let err = service
            .register(form("SCPSC", "7", "Math", "male"))
            .await
            .unwrap_err();

        // the stale 001 collides with the existing row on every attempt
        assert_eq!(err, RegistrationError::AllocationConflict { attempts: 5 });
    }

    #[tokio::test]
    async fn test_media_failure_uses_placeholders() {
        let store = Arc::new(InMemoryStore::new());
        let service = service_with(store, Arc::new(MemoryMediaStore::failing()));

        let registration = service.register(form("SCPSC", "9", "Math", "female")).await.unwrap();

        assert_eq!(registration.photo_url, "/static/placeholder-photo.png");
        assert_eq!(registration.signature_url, "/static/placeholder-signature.png");
        assert_eq!(registration.registration_number, "3010922001");
    }

    #[tokio::test]
    async fn test_uploaded_media_url_is_stored() {
        let store = Arc::new(InMemoryStore::new());
        let service = service_with(store, Arc::new(MemoryMediaStore::new()));

        let registration = service.register(form("SCPSC", "9", "Math", "female")).await.unwrap();

        assert!(registration.photo_url.starts_with("mem://photo/"));
        assert_eq!(registration.signature_url, "/static/placeholder-signature.png");
    }

    #[tokio::test]
    async fn test_form_validation() {
        let service = service_with(
            Arc::new(InMemoryStore::new()),
            Arc::new(MemoryMediaStore::new()),
        );

        let mut bad = form("SCPSC", "7", "Math", "male");
        bad.student_name = "   ".into();
        let err = service.register(bad).await.unwrap_err();
        assert_eq!(
            err,
            RegistrationError::InvalidField {
                field: "student_name",
                reason: "must not be empty"
            }
        );

        let mut bad = form("SCPSC", "7", "Math", "male");
        bad.phone = "01711-223344".into();
        let err = service.register(bad).await.unwrap_err();
        assert!(matches!(err, RegistrationError::InvalidField { field: "phone", .. }));

        let mut ok = form("SCPSC", "7", "Math", "male");
        ok.phone = "+8801711223344".into();
        assert!(service.register(ok).await.is_ok());
    }

    #[tokio::test]
    async fn test_review_and_payment() {
        let store = Arc::new(InMemoryStore::new());
        let service = service_with(store, Arc::new(MemoryMediaStore::new()));
        let created = service.register(form("GBS", "9", "Physics", "female")).await.unwrap();
        let number = created.registration_number.as_str();

        let approved = service.approve(number).await.unwrap();
        assert!(approved.is_approved());

        let err = service.record_payment(number, " ").await.unwrap_err();
        assert!(matches!(err, RegistrationError::InvalidField { .. }));

        let paid = service.record_payment(number, "bKash-8XK2").await.unwrap();
        assert_eq!(paid.payment_status, PaymentStatus::Paid);
        assert_eq!(paid.payment_reference.as_deref(), Some("bKash-8XK2"));

        let rejected = service.reject(number).await.unwrap();
        assert_eq!(rejected.approval_status, ApprovalStatus::Rejected);
    }

    #[tokio::test]
    async fn test_profile_decodes_number() {
        let store = Arc::new(InMemoryStore::new());
        let service = service_with(store, Arc::new(MemoryMediaStore::new()));
        service.register(form("SCPSC", "7", "Math", "male")).await.unwrap();

        let profile = service.profile(" 3010721001 ").await.unwrap();
        let decoded = profile.decoded.unwrap();
        assert_eq!(decoded.institution, "SCPSC");
        assert_eq!(decoded.grade_level, "7");
        assert_eq!(decoded.sequence, "001");

        let err = service.profile("3010721999").await.unwrap_err();
        assert_eq!(err, RegistrationError::NotFound("3010721999".into()));

        let err = service.approve("3010721999").await.unwrap_err();
        assert!(matches!(err, RegistrationError::NotFound(_)));
    }
}
