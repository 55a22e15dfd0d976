//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. Regenerate with
//! `diesel print-schema` after changing a migration.

diesel::table! {
    /// Registered payers.
    ///
    /// The primary key on `registration_number` is the uniqueness constraint
    /// the commit coordinator relies on.
    payers (registration_number) {
        /// Fixed-width, zero-padded registration number.
        registration_number -> Varchar,
        /// Payer display name.
        display_name -> Varchar,
        /// Reference into the locality table.
        locality_id -> Uuid,
        /// First registration timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Named compare-and-swap counters for the sequence allocation strategy.
    registration_sequences (name) {
        /// Counter name.
        name -> Varchar,
        /// Last value handed out.
        last_value -> Int8,
    }
}
