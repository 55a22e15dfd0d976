//! Process-local store implementing the payer and sequence ports.
//!
//! Payers are indexed by registration number, so the uniqueness constraint is
//! checked under the same lock as the write. Each port call takes the lock
//! once; nothing is held across calls, which leaves the same
//! read-then-write gap a shared database has.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use crate::domain::ports::{
    PayerRepository, PayerRepositoryError, RegistrationSequence, RegistrationSequenceError,
};
use crate::domain::{PayerRecord, RegistrationNumber};

#[derive(Debug, Default)]
struct Tables {
    payers: BTreeMap<RegistrationNumber, PayerRecord>,
    sequence: Option<u64>,
}

/// In-memory payer store.
///
/// Clones share the same tables.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPayerStore {
    tables: Arc<Mutex<Tables>>,
}

impl InMemoryPayerStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding `payers`.
    ///
    /// A later record replaces an earlier one with the same number.
    pub fn with_payers(payers: impl IntoIterator<Item = PayerRecord>) -> Self {
        let payers = payers
            .into_iter()
            .map(|payer| (payer.registration_number().clone(), payer))
            .collect();
        Self {
            tables: Arc::new(Mutex::new(Tables {
                payers,
                sequence: None,
            })),
        }
    }

    /// Number of stored payers.
    pub async fn len(&self) -> usize {
        self.tables.lock().await.payers.len()
    }

    /// Whether no payer is stored.
    pub async fn is_empty(&self) -> bool {
        self.tables.lock().await.payers.is_empty()
    }
}

#[async_trait]
impl PayerRepository for InMemoryPayerStore {
    async fn max_registration_number(
        &self,
    ) -> Result<Option<RegistrationNumber>, PayerRepositoryError> {
        let tables = self.tables.lock().await;
        Ok(tables.payers.keys().next_back().cloned())
    }

    async fn exists(
        &self,
        registration_number: &RegistrationNumber,
    ) -> Result<bool, PayerRepositoryError> {
        let tables = self.tables.lock().await;
        Ok(tables.payers.contains_key(registration_number))
    }

    async fn insert(&self, payer: &PayerRecord) -> Result<(), PayerRepositoryError> {
        let mut tables = self.tables.lock().await;
        let key = payer.registration_number();
        if tables.payers.contains_key(key) {
            debug!(registration_number = %key, "in-memory insert hit unique index");
            return Err(PayerRepositoryError::duplicate_key(key.as_str()));
        }
        tables.payers.insert(key.clone(), payer.clone());
        Ok(())
    }

    async fn find(
        &self,
        registration_number: &RegistrationNumber,
    ) -> Result<Option<PayerRecord>, PayerRepositoryError> {
        let tables = self.tables.lock().await;
        Ok(tables.payers.get(registration_number).cloned())
    }

    async fn update(
        &self,
        current: &RegistrationNumber,
        payer: &PayerRecord,
    ) -> Result<bool, PayerRepositoryError> {
        let mut tables = self.tables.lock().await;
        if !tables.payers.contains_key(current) {
            return Ok(false);
        }
        let target = payer.registration_number();
        if target != current && tables.payers.contains_key(target) {
            debug!(registration_number = %target, "in-memory update hit unique index");
            return Err(PayerRepositoryError::duplicate_key(target.as_str()));
        }
        tables.payers.remove(current);
        tables.payers.insert(target.clone(), payer.clone());
        Ok(true)
    }
}

#[async_trait]
impl RegistrationSequence for InMemoryPayerStore {
    async fn current(&self) -> Result<Option<u64>, RegistrationSequenceError> {
        Ok(self.tables.lock().await.sequence)
    }

    async fn compare_and_swap(
        &self,
        expected: Option<u64>,
        next: u64,
    ) -> Result<bool, RegistrationSequenceError> {
        let mut tables = self.tables.lock().await;
        if tables.sequence != expected {
            return Ok(false);
        }
        tables.sequence = Some(next);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use registration_number::NumberWidth;
    use rstest::{fixture, rstest};

    use super::*;
    use crate::domain::{LocalityId, PayerDetails, PayerName};

    fn record(text: &str, name: &str) -> PayerRecord {
        PayerRecord::new(
            registration_number::validate(text, NumberWidth::DEFAULT).expect("valid number"),
            PayerDetails {
                name: PayerName::new(name).expect("valid name"),
                locality_id: LocalityId::random(),
            },
            Utc::now(),
        )
    }

    #[fixture]
    fn store() -> InMemoryPayerStore {
        InMemoryPayerStore::with_payers([
            record("00007", "Ada Lovelace"),
            record("00042", "Grace Hopper"),
            record("00010", "Edsger Dijkstra"),
        ])
    }

    #[rstest]
    #[tokio::test]
    async fn max_follows_numeric_order(store: InMemoryPayerStore) {
        let max = store
            .max_registration_number()
            .await
            .expect("query succeeds")
            .expect("store is not empty");
        assert_eq!(max.as_str(), "00042");
    }

    #[tokio::test]
    async fn empty_store_has_no_max() {
        let store = InMemoryPayerStore::new();
        assert_eq!(store.max_registration_number().await, Ok(None));
        assert!(store.is_empty().await);
    }

    #[rstest]
    #[tokio::test]
    async fn insert_rejects_duplicate_number(store: InMemoryPayerStore) {
        let error = store
            .insert(&record("00042", "Someone Else"))
            .await
            .expect_err("duplicate");

        assert_eq!(error, PayerRepositoryError::duplicate_key("00042"));
        assert_eq!(store.len().await, 3);
    }

    #[rstest]
    #[tokio::test]
    async fn inserted_payer_is_found(store: InMemoryPayerStore) {
        let payer = record("00043", "Barbara Liskov");
        store.insert(&payer).await.expect("insert succeeds");

        let found = store
            .find(payer.registration_number())
            .await
            .expect("lookup succeeds");
        assert_eq!(found, Some(payer.clone()));
        assert_eq!(store.exists(payer.registration_number()).await, Ok(true));
    }

    #[rstest]
    #[tokio::test]
    async fn update_moves_payer_to_free_number(store: InMemoryPayerStore) {
        let current = record("00007", "Ada Lovelace");
        let moved = record("00100", "Ada Lovelace");

        let updated = store
            .update(current.registration_number(), &moved)
            .await
            .expect("update succeeds");

        assert!(updated);
        assert_eq!(store.exists(current.registration_number()).await, Ok(false));
        assert_eq!(store.exists(moved.registration_number()).await, Ok(true));
    }

    #[rstest]
    #[tokio::test]
    async fn update_to_taken_number_is_rejected(store: InMemoryPayerStore) {
        let current = record("00007", "Ada Lovelace");
        let clash = record("00042", "Ada Lovelace");

        let error = store
            .update(current.registration_number(), &clash)
            .await
            .expect_err("duplicate");

        assert_eq!(error, PayerRepositoryError::duplicate_key("00042"));
        let kept = store
            .find(clash.registration_number())
            .await
            .expect("lookup succeeds")
            .expect("payer kept");
        assert_eq!(kept.name().as_ref(), "Grace Hopper");
    }

    #[rstest]
    #[tokio::test]
    async fn update_of_missing_payer_reports_false(store: InMemoryPayerStore) {
        let missing = record("00500", "Nobody");
        assert_eq!(
            store.update(missing.registration_number(), &missing).await,
            Ok(false)
        );
    }

    #[tokio::test]
    async fn sequence_swaps_only_from_expected_value() {
        let store = InMemoryPayerStore::new();

        assert_eq!(store.compare_and_swap(Some(3), 4).await, Ok(false));
        assert_eq!(store.compare_and_swap(None, 1).await, Ok(true));
        assert_eq!(store.compare_and_swap(None, 2).await, Ok(false));
        assert_eq!(store.compare_and_swap(Some(1), 2).await, Ok(true));
        assert_eq!(store.current().await, Ok(Some(2)));
    }
}
