//! Payer data model.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::RegistrationNumber;

/// Validation errors returned by [`PayerName::new`] and [`LocalityId::new`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayerValidationError {
    EmptyName,
    NameNotTrimmed,
    NameTooLong { max: usize },
    NameControlCharacters,
    InvalidLocalityId,
}

impl fmt::Display for PayerValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "payer name must not be empty"),
            Self::NameNotTrimmed => {
                write!(f, "payer name must not start or end with whitespace")
            }
            Self::NameTooLong { max } => {
                write!(f, "payer name must be at most {max} characters")
            }
            Self::NameControlCharacters => {
                write!(f, "payer name must not contain control characters")
            }
            Self::InvalidLocalityId => write!(f, "locality id must be a valid UUID"),
        }
    }
}

impl std::error::Error for PayerValidationError {}

/// Maximum allowed length for a payer name.
pub const PAYER_NAME_MAX: usize = 120;

/// Display name of a payer as entered by an administrator.
///
/// ## Invariants
/// - Non-empty and free of leading/trailing whitespace.
/// - At most [`PAYER_NAME_MAX`] characters.
/// - No control characters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PayerName(String);

impl PayerName {
    /// Validate and construct a [`PayerName`] from owned input.
    pub fn new(name: impl Into<String>) -> Result<Self, PayerValidationError> {
        Self::from_owned(name.into())
    }

    fn from_owned(name: String) -> Result<Self, PayerValidationError> {
        if name.trim().is_empty() {
            return Err(PayerValidationError::EmptyName);
        }
        if name.trim() != name {
            return Err(PayerValidationError::NameNotTrimmed);
        }
        if name.chars().count() > PAYER_NAME_MAX {
            return Err(PayerValidationError::NameTooLong {
                max: PAYER_NAME_MAX,
            });
        }
        if name.chars().any(char::is_control) {
            return Err(PayerValidationError::NameControlCharacters);
        }
        Ok(Self(name))
    }
}

impl AsRef<str> for PayerName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for PayerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<PayerName> for String {
    fn from(value: PayerName) -> Self {
        value.0
    }
}

impl TryFrom<String> for PayerName {
    type Error = PayerValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}

/// Reference to the locality a payer belongs to.
///
/// Localities are maintained by the reference-table screens; this subsystem
/// only carries the identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocalityId(Uuid);

impl LocalityId {
    /// Validate and construct a [`LocalityId`] from its string form.
    pub fn new(id: impl AsRef<str>) -> Result<Self, PayerValidationError> {
        Uuid::parse_str(id.as_ref())
            .map(Self)
            .map_err(|_| PayerValidationError::InvalidLocalityId)
    }

    /// Wrap an already validated UUID, e.g. one loaded from the database.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Generate a new random [`LocalityId`].
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for LocalityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Data an administrator supplies when registering a payer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayerDetails {
    /// Display name of the payer.
    pub name: PayerName,
    /// Locality the payer belongs to.
    pub locality_id: LocalityId,
}

/// Fields an administrator may change on an existing payer.
///
/// `registration_number` is the raw edited text; it is validated before use.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayerChanges {
    /// New display name, if changed.
    pub name: Option<PayerName>,
    /// New locality, if changed.
    pub locality_id: Option<LocalityId>,
    /// Manually edited registration number, if changed.
    pub registration_number: Option<String>,
}

/// Persisted payer.
///
/// ## Invariants
/// - `registration_number` is unique among committed payers; the store
///   enforces this at write time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PayerRecord {
    registration_number: RegistrationNumber,
    name: PayerName,
    locality_id: LocalityId,
    registered_at: DateTime<Utc>,
}

impl PayerRecord {
    /// Build a record for `details` under `registration_number`.
    pub fn new(
        registration_number: RegistrationNumber,
        details: PayerDetails,
        registered_at: DateTime<Utc>,
    ) -> Self {
        Self {
            registration_number,
            name: details.name,
            locality_id: details.locality_id,
            registered_at,
        }
    }

    /// Registration number the payer is stored under.
    pub fn registration_number(&self) -> &RegistrationNumber {
        &self.registration_number
    }

    /// Display name of the payer.
    pub fn name(&self) -> &PayerName {
        &self.name
    }

    /// Locality the payer belongs to.
    pub fn locality_id(&self) -> LocalityId {
        self.locality_id
    }

    /// When the payer was first registered.
    pub fn registered_at(&self) -> DateTime<Utc> {
        self.registered_at
    }

    /// Apply edited fields, keeping everything else and the registration
    /// timestamp unchanged.
    pub fn with_changes(
        &self,
        registration_number: Option<RegistrationNumber>,
        name: Option<PayerName>,
        locality_id: Option<LocalityId>,
    ) -> Self {
        Self {
            registration_number: registration_number
                .unwrap_or_else(|| self.registration_number.clone()),
            name: name.unwrap_or_else(|| self.name.clone()),
            locality_id: locality_id.unwrap_or(self.locality_id),
            registered_at: self.registered_at,
        }
    }
}
