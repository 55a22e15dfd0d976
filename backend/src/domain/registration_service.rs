//! Payer registration domain service.
//!
//! Implements the [`PayerRegistrationCommand`] and [`PayerRegistrationQuery`]
//! driving ports on top of a [`PayerRepository`], a [`CandidateAllocator`] and
//! the [`CommitCoordinator`].

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{debug, info, warn};

use super::allocator::CandidateAllocator;
use super::commit_coordinator::CommitCoordinator;
use super::error::map_payer_repository_error;
use super::ports::{
    PayerRegistrationCommand, PayerRegistrationQuery, PayerRepository, RegisterPayerRequest,
    RegisterPayerResponse, UpdatePayerRequest,
};
use super::{PayerRecord, RegistrationError, RegistrationNumber, RegistrationPolicy};

/// Payer registration service implementing the driving ports.
#[derive(Clone)]
pub struct PayerRegistrationService<R, A> {
    repository: Arc<R>,
    allocator: Arc<A>,
    coordinator: CommitCoordinator<R, A>,
    policy: RegistrationPolicy,
}

impl<R, A> PayerRegistrationService<R, A> {
    /// Create a new service over the given repository and allocator.
    pub fn new(
        repository: Arc<R>,
        allocator: Arc<A>,
        policy: RegistrationPolicy,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let coordinator =
            CommitCoordinator::new(Arc::clone(&repository), Arc::clone(&allocator), policy, clock);
        Self {
            repository,
            allocator,
            coordinator,
            policy,
        }
    }

    /// Policy the service validates and commits against.
    pub fn policy(&self) -> RegistrationPolicy {
        self.policy
    }
}

impl<R, A> PayerRegistrationService<R, A>
where
    R: PayerRepository,
    A: CandidateAllocator,
{
    fn validate(&self, text: &str) -> Result<RegistrationNumber, RegistrationError> {
        self.policy.validate(text).map_err(|error| {
            debug!(input = text, error = %error, "rejected registration number");
            RegistrationError::from(error)
        })
    }

    async fn load(&self, number: &RegistrationNumber) -> Result<PayerRecord, RegistrationError> {
        self.repository
            .find(number)
            .await
            .map_err(map_payer_repository_error)?
            .ok_or_else(|| RegistrationError::not_found(number.as_str()))
    }

    /// Resolve the edited registration number, if it differs from `current`.
    ///
    /// A renumbered payer must land on a free number. The pre-check is
    /// advisory; the store's uniqueness constraint still decides at write
    /// time.
    async fn renumber_target(
        &self,
        current: &RegistrationNumber,
        edited: Option<&str>,
    ) -> Result<Option<RegistrationNumber>, RegistrationError> {
        let Some(text) = edited else {
            return Ok(None);
        };
        let target = self.validate(text)?;
        if &target == current {
            return Ok(None);
        }
        let taken = self
            .repository
            .exists(&target)
            .await
            .map_err(map_payer_repository_error)?;
        if taken {
            warn!(
                current = %current,
                requested = %target,
                "renumbering rejected: number already taken"
            );
            return Err(RegistrationError::conflict(target, 1));
        }
        Ok(Some(target))
    }
}

#[async_trait]
impl<R, A> PayerRegistrationCommand for PayerRegistrationService<R, A>
where
    R: PayerRepository,
    A: CandidateAllocator,
{
    async fn request_candidate(&self) -> Result<RegistrationNumber, RegistrationError> {
        self.allocator.allocate().await
    }

    async fn submit(
        &self,
        request: RegisterPayerRequest,
    ) -> Result<RegisterPayerResponse, RegistrationError> {
        let candidate = self.validate(&request.candidate)?;
        let committed = self
            .coordinator
            .commit(candidate.clone(), &request.payer)
            .await?;
        let regenerated = committed.payer.registration_number() != &candidate;
        Ok(RegisterPayerResponse {
            payer: committed.payer,
            regenerated,
        })
    }

    async fn update(&self, request: UpdatePayerRequest) -> Result<PayerRecord, RegistrationError> {
        let current = self.validate(&request.registration_number)?;
        let existing = self.load(&current).await?;
        let changes = request.changes;
        let target = self
            .renumber_target(&current, changes.registration_number.as_deref())
            .await?;

        let updated = existing.with_changes(target, changes.name, changes.locality_id);
        match self.repository.update(&current, &updated).await {
            Ok(true) => {
                info!(
                    previous = %current,
                    registration_number = %updated.registration_number(),
                    "payer updated"
                );
                Ok(updated)
            }
            Ok(false) => Err(RegistrationError::not_found(current.as_str())),
            Err(error) => Err(map_payer_repository_error(error)),
        }
    }
}

#[async_trait]
impl<R, A> PayerRegistrationQuery for PayerRegistrationService<R, A>
where
    R: PayerRepository,
    A: CandidateAllocator,
{
    async fn find_payer(
        &self,
        registration_number: &str,
    ) -> Result<Option<PayerRecord>, RegistrationError> {
        let number = self.validate(registration_number)?;
        self.repository
            .find(&number)
            .await
            .map_err(map_payer_repository_error)
    }
}

#[cfg(test)]
#[path = "registration_service_tests.rs"]
mod tests;
