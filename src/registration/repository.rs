//! Repository layer for registration records

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use super::models::{ApprovalStatus, PaymentStatus, Registration, RegistrationRecord};
use crate::db::StoreError;
use crate::registration_number::SequenceLookup;

/// Persistence needed by the registration workflow
///
/// `insert` must fail with [`StoreError::Duplicate`] when the registration
/// number is already taken; the workflow relies on it to detect lost races.
#[async_trait]
pub trait RegistrationStore: SequenceLookup {
    async fn insert(&self, record: &RegistrationRecord) -> Result<Registration, StoreError>;

    async fn get_by_number(&self, number: &str) -> Result<Option<Registration>, StoreError>;

    async fn set_approval_status(
        &self,
        number: &str,
        status: ApprovalStatus,
    ) -> Result<Registration, StoreError>;

    async fn record_payment(
        &self,
        number: &str,
        reference: &str,
    ) -> Result<Registration, StoreError>;
}

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS registrations (
    id                  BIGSERIAL PRIMARY KEY,
    registration_number CHAR(10) NOT NULL UNIQUE,
    student_name        TEXT NOT NULL,
    father_name         TEXT NOT NULL,
    mother_name         TEXT NOT NULL,
    phone               TEXT NOT NULL,
    email               TEXT,
    institution         TEXT NOT NULL,
    grade_level         TEXT NOT NULL,
    subject_track       TEXT NOT NULL,
    sex_category        TEXT NOT NULL,
    photo_url           TEXT NOT NULL,
    signature_url       TEXT NOT NULL,
    approval_status     SMALLINT NOT NULL DEFAULT 0,
    payment_status      SMALLINT NOT NULL DEFAULT 0,
    payment_reference   TEXT,
    created_at          TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at          TIMESTAMPTZ NOT NULL DEFAULT NOW()
)
"#;

const COLUMNS: &str = r#"id, registration_number, student_name, father_name, mother_name,
    phone, email, institution, grade_level, subject_track, sex_category,
    photo_url, signature_url, approval_status, payment_status, payment_reference,
    created_at, updated_at"#;

/// PostgreSQL-backed registration store
pub struct PgRegistrationRepository {
    pool: PgPool,
}

impl PgRegistrationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the `registrations` table if it does not exist
    pub async fn init_schema(&self) -> Result<(), StoreError> {
        sqlx::query(SCHEMA).execute(&self.pool).await?;
        tracing::info!("registrations schema ready");
        Ok(())
    }

    fn row_to_registration(row: &PgRow) -> Result<Registration, StoreError> {
        Ok(Registration {
            id: row.try_get("id")?,
            registration_number: row.try_get("registration_number")?,
            student_name: row.try_get("student_name")?,
            father_name: row.try_get("father_name")?,
            mother_name: row.try_get("mother_name")?,
            phone: row.try_get("phone")?,
            email: row.try_get("email")?,
            institution: row.try_get("institution")?,
            grade_level: row.try_get("grade_level")?,
            subject_track: row.try_get("subject_track")?,
            sex_category: row.try_get("sex_category")?,
            photo_url: row.try_get("photo_url")?,
            signature_url: row.try_get("signature_url")?,
            approval_status: ApprovalStatus::from(row.try_get::<i16, _>("approval_status")?),
            payment_status: PaymentStatus::from(row.try_get::<i16, _>("payment_status")?),
            payment_reference: row.try_get("payment_reference")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

#[async_trait]
impl SequenceLookup for PgRegistrationRepository {
    async fn last_sequence(&self, prefix: &str) -> Result<u32, StoreError> {
        // prefix is all digits, no LIKE escaping needed
        let max = sqlx::query_scalar::<_, i32>(
            r#"
            SELECT COALESCE(MAX(CAST(SUBSTRING(registration_number FROM 8 FOR 3) AS INTEGER)), 0)
            FROM registrations
            WHERE registration_number LIKE $1
            "#,
        )
        .bind(format!("{prefix}%"))
        .fetch_one(&self.pool)
        .await?;

        Ok(max.max(0) as u32)
    }
}

#[async_trait]
impl RegistrationStore for PgRegistrationRepository {
    async fn insert(&self, record: &RegistrationRecord) -> Result<Registration, StoreError> {
        let sql = format!(
            r#"
            INSERT INTO registrations
                (registration_number, student_name, father_name, mother_name, phone, email,
                 institution, grade_level, subject_track, sex_category, photo_url, signature_url)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING {COLUMNS}
            "#
        );
        let row = sqlx::query(&sql)
            .bind(&record.registration_number)
            .bind(&record.student_name)
            .bind(&record.father_name)
            .bind(&record.mother_name)
            .bind(&record.phone)
            .bind(&record.email)
            .bind(&record.institution)
            .bind(&record.grade_level)
            .bind(&record.subject_track)
            .bind(&record.sex_category)
            .bind(&record.photo_url)
            .bind(&record.signature_url)
            .fetch_one(&self.pool)
            .await?;

        Self::row_to_registration(&row)
    }

    async fn get_by_number(&self, number: &str) -> Result<Option<Registration>, StoreError> {
        let sql = format!("SELECT {COLUMNS} FROM registrations WHERE registration_number = $1");
        let row = sqlx::query(&sql)
            .bind(number)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(Self::row_to_registration).transpose()
    }

    async fn set_approval_status(
        &self,
        number: &str,
        status: ApprovalStatus,
    ) -> Result<Registration, StoreError> {
        let sql = format!(
            r#"
            UPDATE registrations SET approval_status = $1, updated_at = NOW()
            WHERE registration_number = $2
            RETURNING {COLUMNS}
            "#
        );
        let row = sqlx::query(&sql)
            .bind(status.id())
            .bind(number)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::NotFound(number.to_string()))?;

        Self::row_to_registration(&row)
    }

    async fn record_payment(
        &self,
        number: &str,
        reference: &str,
    ) -> Result<Registration, StoreError> {
        let sql = format!(
            r#"
            UPDATE registrations
            SET payment_status = $1, payment_reference = $2, updated_at = NOW()
            WHERE registration_number = $3
            RETURNING {COLUMNS}
            "#
        );
        let row = sqlx::query(&sql)
            .bind(PaymentStatus::Paid.id())
            .bind(reference)
            .bind(number)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::NotFound(number.to_string()))?;

        Self::row_to_registration(&row)
    }
}
