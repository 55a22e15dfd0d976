//! Per-session allocation state.
//!
//! A data-entry session moves through
//! `Idle -> Allocating -> Offered -> Committing -> Committed`, with
//! `Committing -> Collided -> Allocating` when the number was lost to another
//! session and `Failed` for store or overflow errors. The state is never
//! persisted; cancelling an offered candidate needs no cleanup.
//!
//! ```
//! use ledger_backend::domain::{AllocationSession, AllocationState, NumberWidth, RegistrationNumber};
//!
//! let mut session = AllocationSession::new();
//! session.start().unwrap();
//! session.offer(&RegistrationNumber::first(NumberWidth::DEFAULT)).unwrap();
//! session.edit("00100").unwrap();
//! assert_eq!(session.candidate(), Some("00100"));
//!
//! session.cancel();
//! assert_eq!(session.state(), &AllocationState::Idle);
//! ```

use thiserror::Error;
use tracing::debug;

use super::ports::{PayerRegistrationCommand, RegisterPayerRequest, RegisterPayerResponse};
use super::{PayerDetails, RegistrationError, RegistrationNumber};

/// State of one data-entry session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AllocationState {
    /// No entry in progress.
    #[default]
    Idle,
    /// A candidate has been requested.
    Allocating,
    /// A candidate is shown to the operator, who may edit it.
    Offered {
        /// Candidate text as currently shown.
        candidate: String,
        /// Whether the operator changed the generated value.
        edited: bool,
    },
    /// The candidate has been submitted.
    Committing {
        /// Candidate text being committed.
        candidate: String,
    },
    /// The candidate stayed taken after every commit attempt.
    Collided {
        /// Last number that collided, which differs from the submitted
        /// candidate once a regeneration happened.
        candidate: String,
    },
    /// The payer was registered.
    Committed {
        /// Number actually used.
        registration_number: RegistrationNumber,
    },
    /// The attempt failed for a reason a new candidate cannot fix.
    Failed {
        /// Failure reported by the service.
        error: RegistrationError,
    },
}

impl AllocationState {
    /// Short lowercase name used in transition errors and logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Allocating => "allocating",
            Self::Offered { .. } => "offered",
            Self::Committing { .. } => "committing",
            Self::Collided { .. } => "collided",
            Self::Committed { .. } => "committed",
            Self::Failed { .. } => "failed",
        }
    }
}

/// Raised when an action is not allowed in the session's current state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot {action} while {state}")]
pub struct SessionTransitionError {
    /// Attempted action.
    pub action: &'static str,
    /// State the session was in.
    pub state: &'static str,
}

/// Errors returned by the session drivers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// The session was not in a state allowing the action.
    #[error(transparent)]
    Transition(#[from] SessionTransitionError),
    /// The registration service rejected the attempt.
    #[error(transparent)]
    Registration(#[from] RegistrationError),
}

/// State machine for one data-entry session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllocationSession {
    state: AllocationState,
}

impl AllocationSession {
    /// Create an idle session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state.
    pub fn state(&self) -> &AllocationState {
        &self.state
    }

    /// Candidate text currently offered, committing or collided.
    pub fn candidate(&self) -> Option<&str> {
        match &self.state {
            AllocationState::Offered { candidate, .. }
            | AllocationState::Committing { candidate }
            | AllocationState::Collided { candidate } => Some(candidate),
            _ => None,
        }
    }

    fn reject(&self, action: &'static str) -> SessionTransitionError {
        SessionTransitionError {
            action,
            state: self.state.name(),
        }
    }

    /// Begin requesting a candidate.
    ///
    /// Allowed from `Idle`, `Collided`, `Committed` and `Failed`.
    pub fn start(&mut self) -> Result<(), SessionTransitionError> {
        match self.state {
            AllocationState::Idle
            | AllocationState::Collided { .. }
            | AllocationState::Committed { .. }
            | AllocationState::Failed { .. } => {
                self.state = AllocationState::Allocating;
                Ok(())
            }
            _ => Err(self.reject("start allocating")),
        }
    }

    /// Show a freshly allocated candidate.
    pub fn offer(&mut self, candidate: &RegistrationNumber) -> Result<(), SessionTransitionError> {
        if self.state != AllocationState::Allocating {
            return Err(self.reject("offer a candidate"));
        }
        self.state = AllocationState::Offered {
            candidate: candidate.as_str().to_owned(),
            edited: false,
        };
        Ok(())
    }

    /// Replace the offered candidate with operator-entered text.
    ///
    /// The text is validated on submission, not here.
    pub fn edit(&mut self, text: impl Into<String>) -> Result<(), SessionTransitionError> {
        if !matches!(self.state, AllocationState::Offered { .. }) {
            return Err(self.reject("edit the candidate"));
        }
        self.state = AllocationState::Offered {
            candidate: text.into(),
            edited: true,
        };
        Ok(())
    }

    /// Move the offered candidate to `Committing`, returning its text.
    pub fn begin_commit(&mut self) -> Result<String, SessionTransitionError> {
        let AllocationState::Offered { candidate, .. } = &self.state else {
            return Err(self.reject("commit"));
        };
        let candidate = candidate.clone();
        self.state = AllocationState::Committing {
            candidate: candidate.clone(),
        };
        Ok(candidate)
    }

    /// Record that the commit lost `registration_number` to another session.
    ///
    /// After a regeneration this is the last number tried, not the one that
    /// was submitted.
    pub fn collided(
        &mut self,
        registration_number: impl Into<String>,
    ) -> Result<(), SessionTransitionError> {
        if !matches!(self.state, AllocationState::Committing { .. }) {
            return Err(self.reject("record a collision"));
        }
        self.state = AllocationState::Collided {
            candidate: registration_number.into(),
        };
        Ok(())
    }

    /// Record the number the payer was registered under.
    pub fn committed(
        &mut self,
        registration_number: RegistrationNumber,
    ) -> Result<(), SessionTransitionError> {
        if !matches!(self.state, AllocationState::Committing { .. }) {
            return Err(self.reject("record a commit"));
        }
        self.state = AllocationState::Committed {
            registration_number,
        };
        Ok(())
    }

    /// Record a failure while allocating or committing.
    pub fn failed(&mut self, error: RegistrationError) -> Result<(), SessionTransitionError> {
        if !matches!(
            self.state,
            AllocationState::Allocating | AllocationState::Committing { .. }
        ) {
            return Err(self.reject("record a failure"));
        }
        self.state = AllocationState::Failed { error };
        Ok(())
    }

    /// Discard whatever is in progress and return to `Idle`.
    pub fn cancel(&mut self) {
        debug!(state = self.state.name(), "allocation session cancelled");
        self.state = AllocationState::Idle;
    }

    /// Request a candidate from `command` and offer it.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Transition`] when a candidate is already on
    /// offer or being committed, and [`SessionError::Registration`] when the
    /// service fails, leaving the session `Failed`.
    pub async fn request_candidate<C>(
        &mut self,
        command: &C,
    ) -> Result<RegistrationNumber, SessionError>
    where
        C: PayerRegistrationCommand + ?Sized,
    {
        self.start()?;
        match command.request_candidate().await {
            Ok(candidate) => {
                self.offer(&candidate)?;
                Ok(candidate)
            }
            Err(error) => {
                self.failed(error.clone())?;
                Err(error.into())
            }
        }
    }

    /// Submit the offered candidate for `payer`.
    ///
    /// A malformed candidate returns the session to `Offered` for correction.
    /// A conflict leaves it `Collided`, from which a new candidate may be
    /// requested. Store and overflow failures leave it `Failed`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Transition`] when nothing is on offer, and
    /// [`SessionError::Registration`] with the service's error otherwise.
    pub async fn submit<C>(
        &mut self,
        command: &C,
        payer: PayerDetails,
    ) -> Result<RegisterPayerResponse, SessionError>
    where
        C: PayerRegistrationCommand + ?Sized,
    {
        let edited = matches!(self.state, AllocationState::Offered { edited: true, .. });
        let candidate = self.begin_commit()?;
        let request = RegisterPayerRequest {
            candidate: candidate.clone(),
            payer,
        };

        match command.submit(request).await {
            Ok(response) => {
                self.committed(response.payer.registration_number().clone())?;
                Ok(response)
            }
            Err(error @ RegistrationError::Format { .. }) => {
                self.state = AllocationState::Offered { candidate, edited };
                Err(error.into())
            }
            Err(RegistrationError::Conflict {
                registration_number,
                attempts,
            }) => {
                self.collided(registration_number.clone())?;
                Err(RegistrationError::Conflict {
                    registration_number,
                    attempts,
                }
                .into())
            }
            Err(error) => {
                self.failed(error.clone())?;
                Err(error.into())
            }
        }
    }
}
