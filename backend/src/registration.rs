//! Build the registration ports from [`RegistrationSettings`].
//!
//! With a database URL the service runs over the Diesel adapters sharing one
//! pool; without one it runs over a fresh [`InMemoryPayerStore`]. Either way
//! the configured strategy picks the allocator and the policy bounds commit
//! attempts.

use std::sync::Arc;

use mockable::DefaultClock;
use thiserror::Error;
use tracing::info;

use crate::config::{RegistrationSettings, SettingsError};
use crate::domain::ports::{PayerRegistrationCommand, PayerRegistrationQuery};
use crate::domain::{
    ConfiguredAllocator, PayerRegistrationService, RegistrationPolicy, RegistrationStrategy,
};
use crate::outbound::memory::InMemoryPayerStore;
use crate::outbound::persistence::{
    DbPool, DieselPayerRepository, DieselRegistrationSequence, PoolError,
};

/// Errors raised while assembling the registration ports.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompositionError {
    /// The settings do not describe a valid policy or strategy.
    #[error(transparent)]
    Settings(#[from] SettingsError),
    /// The database pool could not be created.
    #[error(transparent)]
    Pool(#[from] PoolError),
}

/// Command and query ports sharing one registration service.
#[derive(Clone)]
pub struct RegistrationPorts {
    /// Candidate allocation, submission and edit-mode updates.
    pub command: Arc<dyn PayerRegistrationCommand>,
    /// Lookups by registration number.
    pub query: Arc<dyn PayerRegistrationQuery>,
}

fn service_ports<R, S>(
    repository: Arc<R>,
    sequence: Arc<S>,
    strategy: RegistrationStrategy,
    policy: RegistrationPolicy,
) -> RegistrationPorts
where
    PayerRegistrationService<R, ConfiguredAllocator<R, S>>:
        PayerRegistrationCommand + PayerRegistrationQuery + 'static,
{
    let allocator = ConfiguredAllocator::for_strategy(
        strategy,
        Arc::clone(&repository),
        sequence,
        policy.width(),
    );
    let service = Arc::new(PayerRegistrationService::new(
        repository,
        Arc::new(allocator),
        policy,
        Arc::new(DefaultClock),
    ));
    RegistrationPorts {
        command: Arc::clone(&service) as Arc<dyn PayerRegistrationCommand>,
        query: service as Arc<dyn PayerRegistrationQuery>,
    }
}

/// Assemble the registration ports described by `settings`.
///
/// # Errors
///
/// Returns [`CompositionError::Settings`] before touching any store when the
/// settings are invalid, and [`CompositionError::Pool`] when the configured
/// database pool cannot be built.
pub async fn build_registration_ports(
    settings: &RegistrationSettings,
) -> Result<RegistrationPorts, CompositionError> {
    let policy = settings.policy()?;
    let strategy = settings.strategy()?;

    match settings.pool_config() {
        Some(config) => {
            let pool = DbPool::new(config).await?;
            info!(
                strategy = strategy.as_str(),
                width = policy.width().get(),
                "registration backed by PostgreSQL"
            );
            Ok(service_ports(
                Arc::new(DieselPayerRepository::new(pool.clone(), policy.width())),
                Arc::new(DieselRegistrationSequence::new(pool)),
                strategy,
                policy,
            ))
        }
        None => {
            info!(
                strategy = strategy.as_str(),
                width = policy.width().get(),
                "registration backed by the in-memory store"
            );
            let store = Arc::new(InMemoryPayerStore::new());
            Ok(service_ports(Arc::clone(&store), store, strategy, policy))
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::domain::ports::RegisterPayerRequest;
    use crate::domain::{LocalityId, PayerDetails, PayerName, RegistrationError};

    fn settings(number_width: u8, strategy: Option<&str>) -> RegistrationSettings {
        RegistrationSettings {
            number_width,
            max_commit_attempts: 2,
            strategy: strategy.map(str::to_owned),
            database_url: None,
            pool_max_size: None,
            pool_timeout_secs: None,
        }
    }

    fn payer() -> PayerDetails {
        PayerDetails {
            name: PayerName::new("Harbour Trust").expect("valid name"),
            locality_id: LocalityId::random(),
        }
    }

    async fn register_next(ports: &RegistrationPorts) -> String {
        let candidate = ports.command.request_candidate().await.expect("candidate");
        ports
            .command
            .submit(RegisterPayerRequest {
                candidate: candidate.as_str().to_owned(),
                payer: payer(),
            })
            .await
            .expect("registration succeeds")
            .payer
            .registration_number()
            .as_str()
            .to_owned()
    }

    #[rstest]
    #[tokio::test]
    async fn in_memory_ports_share_one_store() {
        let ports = build_registration_ports(&settings(4, None))
            .await
            .expect("ports");

        assert_eq!(register_next(&ports).await, "0001");
        assert_eq!(register_next(&ports).await, "0002");
        let found = ports
            .query
            .find_payer("0002")
            .await
            .expect("lookup succeeds");
        assert!(found.is_some());
    }

    #[rstest]
    #[case::optimistic(None, "00001")]
    #[case::sequence(Some("sequence"), "00002")]
    #[tokio::test]
    async fn strategy_decides_whether_candidates_are_reserved(
        #[case] strategy: Option<&str>,
        #[case] second: &str,
    ) {
        let ports = build_registration_ports(&settings(5, strategy))
            .await
            .expect("ports");

        let first = ports.command.request_candidate().await.expect("candidate");
        let next = ports.command.request_candidate().await.expect("candidate");
        assert_eq!(first.as_str(), "00001");
        assert_eq!(next.as_str(), second);
    }

    #[rstest]
    #[tokio::test]
    async fn invalid_settings_fail_before_connecting() {
        let mut settings = settings(5, Some("random"));
        settings.database_url = Some("postgres://unreachable.invalid/ledger".to_owned());

        let error = build_registration_ports(&settings)
            .await
            .err()
            .expect("invalid strategy");
        assert!(matches!(
            error,
            CompositionError::Settings(SettingsError::Strategy(_))
        ));
    }

    #[rstest]
    #[tokio::test]
    async fn overflow_surfaces_through_the_built_ports() {
        let ports = build_registration_ports(&settings(1, None))
            .await
            .expect("ports");
        for _ in 0..9 {
            register_next(&ports).await;
        }

        let error = ports
            .command
            .request_candidate()
            .await
            .expect_err("exhausted");
        assert_eq!(error, RegistrationError::Overflow { width: 1 });
    }
}
