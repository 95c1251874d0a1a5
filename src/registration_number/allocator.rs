//! Sequence allocation
//!
//! The allocator reads the highest issued sequence for a prefix through an
//! injected [`SequenceLookup`] and returns the next number. It never writes:
//! the caller inserts the number and retries the whole cycle when the insert
//! loses a race (see `registration::service`).

use async_trait::async_trait;

use super::encoder::{MAX_SEQUENCE, RegistrationNumber, RegistrationRequest, encode_prefix};
use super::error::RegistrationNumberError;
use crate::db::StoreError;

/// Read access to issued sequences
#[async_trait]
pub trait SequenceLookup: Send + Sync {
    /// Highest sequence issued under `prefix`, or 0 when none exist
    async fn last_sequence(&self, prefix: &str) -> Result<u32, StoreError>;
}

/// Compute the next registration number for a request
///
/// A failed lookup is treated as "no prior registrations" and allocation starts
/// at 001. The failure is logged at `warn`.
///
/// # Errors
/// - encoding errors from [`encode_prefix`], unchanged
/// - `SequenceExhausted` when the prefix already issued 999 numbers
pub async fn allocate_number<L>(
    request: &RegistrationRequest,
    lookup: &L,
) -> Result<RegistrationNumber, RegistrationNumberError>
where
    L: SequenceLookup + ?Sized,
{
    let prefix = encode_prefix(request)?;

    let last = match lookup.last_sequence(&prefix).await {
        Ok(last) => last,
        Err(e) => {
            tracing::warn!(
                target: "REGNO",
                prefix = %prefix,
                error = %e,
                "Sequence lookup failed, allocating from 001"
            );
            0
        }
    };

    let next = last.saturating_add(1);
    if next > MAX_SEQUENCE {
        tracing::error!(target: "REGNO", prefix = %prefix, last, "Sequence space exhausted");
        return Err(RegistrationNumberError::SequenceExhausted { prefix });
    }

    let number = RegistrationNumber::compose(&prefix, next);
    tracing::debug!(target: "REGNO", prefix = %prefix, sequence = next, number = %number, "Allocated");
    Ok(number)
}
