//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{payers, registration_sequences};

/// Row struct for reading from the payers table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = payers)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct PayerRow {
    pub registration_number: String,
    pub display_name: String,
    pub locality_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Insertable struct for creating payer records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = payers)]
pub(crate) struct NewPayerRow<'a> {
    pub registration_number: &'a str,
    pub display_name: &'a str,
    pub locality_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Changeset for editing a payer, including moving it to a new number.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = payers)]
pub(crate) struct PayerUpdate<'a> {
    pub registration_number: &'a str,
    pub display_name: &'a str,
    pub locality_id: Uuid,
}

/// Insertable struct for creating a sequence row on first use.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = registration_sequences)]
pub(crate) struct NewSequenceRow<'a> {
    pub name: &'a str,
    pub last_value: i64,
}
