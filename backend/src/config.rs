//! Registration configuration loaded via OrthoConfig.

use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use thiserror::Error;

use crate::domain::{
    NumberWidth, NumberWidthError, ParseRegistrationStrategyError, RegistrationPolicy,
    RegistrationPolicyError, RegistrationStrategy,
};
use crate::outbound::persistence::PoolConfig;

/// Errors raised when turning loaded settings into domain values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingsError {
    /// `number_width` is outside the supported range.
    #[error(transparent)]
    Width(#[from] NumberWidthError),
    /// `max_commit_attempts` is zero.
    #[error(transparent)]
    Policy(#[from] RegistrationPolicyError),
    /// `strategy` names no known allocation strategy.
    #[error(transparent)]
    Strategy(#[from] ParseRegistrationStrategyError),
}

/// Configuration values controlling registration number allocation.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "REGISTRATION")]
pub struct RegistrationSettings {
    /// Number of digits in a registration number.
    #[ortho_config(default = 5)]
    pub number_width: u8,
    /// Commit attempts per submission, including the first.
    #[ortho_config(default = 2)]
    pub max_commit_attempts: u32,
    /// Allocation strategy: `optimistic` or `sequence`.
    pub strategy: Option<String>,
    /// PostgreSQL connection string. The in-memory store is used when unset.
    pub database_url: Option<String>,
    /// Upper bound on pooled database connections.
    pub pool_max_size: Option<u32>,
    /// Seconds to wait for a pooled connection before failing.
    pub pool_timeout_secs: Option<u64>,
}

impl RegistrationSettings {
    /// Return the configured width.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Width`] when the width is out of range.
    pub fn number_width(&self) -> Result<NumberWidth, SettingsError> {
        Ok(NumberWidth::new(self.number_width)?)
    }

    /// Return the configured commit attempt bound.
    pub fn max_commit_attempts(&self) -> u32 {
        self.max_commit_attempts
    }

    /// Return the configured allocation strategy, falling back to
    /// [`RegistrationStrategy::Optimistic`].
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Strategy`] for unknown names.
    pub fn strategy(&self) -> Result<RegistrationStrategy, SettingsError> {
        self.strategy
            .as_deref()
            .map_or(Ok(RegistrationStrategy::default()), str::parse)
            .map_err(SettingsError::from)
    }

    /// Return the configured database URL, if any.
    pub fn database_url(&self) -> Option<&str> {
        self.database_url.as_deref()
    }

    /// Build the pool configuration for the configured database, if any.
    ///
    /// Unset pool fields keep the [`PoolConfig`] defaults.
    pub fn pool_config(&self) -> Option<PoolConfig> {
        let mut config = PoolConfig::new(self.database_url()?);
        if let Some(max_size) = self.pool_max_size {
            config = config.with_max_size(max_size);
        }
        if let Some(secs) = self.pool_timeout_secs {
            config = config.with_connection_timeout(Duration::from_secs(secs));
        }
        Some(config)
    }

    /// Build the validated [`RegistrationPolicy`].
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError`] when the width or attempt bound is invalid.
    pub fn policy(&self) -> Result<RegistrationPolicy, SettingsError> {
        Ok(RegistrationPolicy::new(
            self.number_width()?,
            self.max_commit_attempts(),
        )?)
    }
}
