//! Commit coordination for new payer registrations.
//!
//! Candidates are not reserved when offered, so another session may commit
//! the same number first. The coordinator runs a point existence check, then
//! the insert, and treats either a positive check or a uniqueness violation
//! at insert time as a collision. A collided candidate is discarded and a
//! fresh one is allocated, up to the policy's attempt limit.
//!
//! Store failures are never retried here.

use std::sync::Arc;

use mockable::Clock;
use tracing::{debug, info, warn};

use super::allocator::CandidateAllocator;
use super::error::map_payer_repository_error;
use super::ports::PayerRepository;
use super::{PayerDetails, PayerRecord, RegistrationError, RegistrationNumber, RegistrationPolicy};

/// A payer committed by the coordinator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommittedPayer {
    /// The stored record, carrying the number actually used.
    pub payer: PayerRecord,
    /// Commit attempts made, including the successful one.
    pub attempts: u32,
}

enum AttemptOutcome {
    Committed(PayerRecord),
    Collided,
}

/// Drives the existence-check, insert, and regenerate-on-collision protocol.
#[derive(Clone)]
pub struct CommitCoordinator<R, A> {
    repository: Arc<R>,
    allocator: Arc<A>,
    policy: RegistrationPolicy,
    clock: Arc<dyn Clock>,
}

impl<R, A> CommitCoordinator<R, A> {
    /// Create a coordinator writing to `repository` and regenerating
    /// candidates through `allocator`.
    pub fn new(
        repository: Arc<R>,
        allocator: Arc<A>,
        policy: RegistrationPolicy,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            allocator,
            policy,
            clock,
        }
    }
}

impl<R, A> CommitCoordinator<R, A>
where
    R: PayerRepository,
    A: CandidateAllocator,
{
    /// Commit `details` under `candidate`, regenerating on collision.
    ///
    /// # Errors
    ///
    /// - [`RegistrationError::Conflict`] once every permitted attempt collided.
    /// - [`RegistrationError::Overflow`] when regeneration exhausts the width.
    /// - [`RegistrationError::Store`] on any store failure, without retry.
    pub async fn commit(
        &self,
        mut candidate: RegistrationNumber,
        details: &PayerDetails,
    ) -> Result<CommittedPayer, RegistrationError> {
        let max_attempts = self.policy.max_commit_attempts();
        let mut attempt = 1;

        loop {
            if let AttemptOutcome::Committed(payer) = self.try_commit(&candidate, details).await? {
                info!(
                    registration_number = %payer.registration_number(),
                    attempt,
                    "payer registered"
                );
                return Ok(CommittedPayer {
                    payer,
                    attempts: attempt,
                });
            }

            if attempt >= max_attempts {
                warn!(
                    registration_number = %candidate,
                    attempts = attempt,
                    "registration number collided on every attempt"
                );
                return Err(RegistrationError::conflict(candidate, attempt));
            }

            let fresh = self.allocator.allocate().await?;
            if fresh == candidate {
                warn!(
                    registration_number = %candidate,
                    "allocator returned the collided number again"
                );
                return Err(RegistrationError::conflict(candidate, attempt));
            }
            warn!(
                collided = %candidate,
                regenerated = %fresh,
                attempt,
                "registration number collided; retrying with a fresh candidate"
            );
            candidate = fresh;
            attempt += 1;
        }
    }

    async fn try_commit(
        &self,
        candidate: &RegistrationNumber,
        details: &PayerDetails,
    ) -> Result<AttemptOutcome, RegistrationError> {
        let taken = self
            .repository
            .exists(candidate)
            .await
            .map_err(map_payer_repository_error)?;
        if taken {
            debug!(registration_number = %candidate, "existence check found a holder");
            return Ok(AttemptOutcome::Collided);
        }

        let record = PayerRecord::new(candidate.clone(), details.clone(), self.clock.utc());
        match self.repository.insert(&record).await {
            Ok(()) => Ok(AttemptOutcome::Committed(record)),
            Err(error) if error.is_duplicate_key() => {
                debug!(
                    registration_number = %candidate,
                    "insert lost the race to a concurrent writer"
                );
                Ok(AttemptOutcome::Collided)
            }
            Err(error) => Err(map_payer_repository_error(error)),
        }
    }
}
