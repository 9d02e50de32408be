//! Transport abstraction over the external catalog service.
//!
//! The coordinators only know this trait. [`HttpCatalogTransport`](crate::HttpCatalogTransport)
//! talks to the real service; [`mock::MockTransport`] is a scriptable stand-in
//! for tests.

use async_trait::async_trait;
use catalog_types::{CatalogEntity, EntityId};
use std::collections::HashMap;

use crate::error::TransportResult;

/// Status and body of a completed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceResponse {
    pub status: u16,
    pub body: Option<String>,
}

impl ServiceResponse {
    pub fn new(status: u16, body: Option<String>) -> Self {
        Self { status, body }
    }

    /// A response without a body.
    pub fn empty(status: u16) -> Self {
        Self::new(status, None)
    }

    /// A response with a text body.
    pub fn with_body(status: u16, body: impl Into<String>) -> Self {
        Self::new(status, Some(body.into()))
    }

    /// Any 2xx status, including 204.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_not_found(&self) -> bool {
        self.status == 404
    }
}

/// The catalog service operations the lifecycle manager consumes.
#[async_trait]
pub trait CatalogTransport: Send + Sync {
    /// `DELETE /entities/{id}`. Non-2xx answers are returned as responses,
    /// not errors, so the caller can classify them.
    async fn delete_entity(&self, id: &EntityId) -> TransportResult<ServiceResponse>;

    /// `PUT /entities/{id}` with the full entity body.
    async fn update_entity(&self, entity: &CatalogEntity) -> TransportResult<ServiceResponse>;

    /// `GET /entities`.
    async fn list_entities(&self) -> TransportResult<Vec<CatalogEntity>>;

    /// Dependent count per entity, for display only.
    async fn dependent_counts(&self) -> TransportResult<HashMap<EntityId, u64>>;
}

/// A mock transport for testing.
pub mod mock {
    use super::*;
    use crate::error::TransportError;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Mutex, MutexGuard, PoisonError};
    use std::time::Duration;

    /// What the mock does for one scripted call.
    #[derive(Debug, Clone)]
    pub enum MockReply {
        Respond(ServiceResponse),
        Fail(TransportError),
    }

    impl MockReply {
        pub fn status(status: u16) -> Self {
            MockReply::Respond(ServiceResponse::empty(status))
        }

        pub fn body(status: u16, body: impl Into<String>) -> Self {
            MockReply::Respond(ServiceResponse::with_body(status, body))
        }

        fn into_result(self) -> TransportResult<ServiceResponse> {
            match self {
                MockReply::Respond(response) => Ok(response),
                MockReply::Fail(error) => Err(error),
            }
        }
    }

    /// A call the mock received.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum MockCall {
        Delete(EntityId),
        Update { id: EntityId, active: bool },
        List,
        DependentCounts,
    }

    /// Scriptable in-memory transport.
    ///
    /// Delete and update calls pop the next scripted reply for the id and fall
    /// back to `204` / `200` when the script is empty.
    #[derive(Debug, Default)]
    pub struct MockTransport {
        deletes: Mutex<HashMap<EntityId, VecDeque<MockReply>>>,
        updates: Mutex<HashMap<EntityId, VecDeque<MockReply>>>,
        entities: Mutex<Vec<CatalogEntity>>,
        list_error: Mutex<Option<TransportError>>,
        counts: Mutex<Option<TransportResult<HashMap<EntityId, u64>>>>,
        calls: Mutex<Vec<MockCall>>,
        delay: Option<Duration>,
        delays: Mutex<HashMap<EntityId, Duration>>,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
    }

    fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
        mutex.lock().unwrap_or_else(PoisonError::into_inner)
    }

    impl MockTransport {
        pub fn new() -> Self {
            Self::default()
        }

        /// Every delete/update call sleeps for `delay` before answering.
        pub fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }

        /// Delete/update calls for `id` sleep for `delay`, overriding
        /// [`with_delay`](Self::with_delay).
        pub fn script_delay(&self, id: &EntityId, delay: Duration) {
            lock(&self.delays).insert(id.clone(), delay);
        }

        /// Entities returned by `list_entities`.
        pub fn with_entities(self, entities: Vec<CatalogEntity>) -> Self {
            *lock(&self.entities) = entities;
            self
        }

        /// Counts returned by `dependent_counts`.
        pub fn with_dependent_counts(self, counts: HashMap<EntityId, u64>) -> Self {
            *lock(&self.counts) = Some(Ok(counts));
            self
        }

        /// Makes `dependent_counts` fail.
        pub fn fail_dependent_counts(self, error: TransportError) -> Self {
            *lock(&self.counts) = Some(Err(error));
            self
        }

        /// Makes `list_entities` fail.
        pub fn fail_list(self, error: TransportError) -> Self {
            *lock(&self.list_error) = Some(error);
            self
        }

        /// Queues a reply for the next delete of `id`.
        pub fn script_delete(&self, id: &EntityId, reply: MockReply) {
            lock(&self.deletes)
                .entry(id.clone())
                .or_default()
                .push_back(reply);
        }

        /// Queues a reply for the next update of `id`.
        pub fn script_update(&self, id: &EntityId, reply: MockReply) {
            lock(&self.updates)
                .entry(id.clone())
                .or_default()
                .push_back(reply);
        }

        /// All calls received so far, in arrival order.
        pub fn calls(&self) -> Vec<MockCall> {
            lock(&self.calls).clone()
        }

        pub fn call_count(&self) -> usize {
            lock(&self.calls).len()
        }

        pub fn delete_calls_for(&self, id: &EntityId) -> usize {
            lock(&self.calls)
                .iter()
                .filter(|call| matches!(call, MockCall::Delete(called) if called == id))
                .count()
        }

        /// Highest number of delete/update calls that were in flight together.
        pub fn max_in_flight(&self) -> usize {
            self.max_in_flight.load(Ordering::SeqCst)
        }

        fn record(&self, call: MockCall) {
            lock(&self.calls).push(call);
        }

        async fn answer(
            &self,
            script: &Mutex<HashMap<EntityId, VecDeque<MockReply>>>,
            id: &EntityId,
            fallback: u16,
        ) -> TransportResult<ServiceResponse> {
            let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(current, Ordering::SeqCst);

            let delay = lock(&self.delays).get(id).copied().or(self.delay);
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            let reply = lock(script)
                .get_mut(id)
                .and_then(VecDeque::pop_front)
                .unwrap_or_else(|| MockReply::status(fallback));

            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            reply.into_result()
        }
    }

    #[async_trait]
    impl CatalogTransport for MockTransport {
        async fn delete_entity(&self, id: &EntityId) -> TransportResult<ServiceResponse> {
            self.record(MockCall::Delete(id.clone()));
            self.answer(&self.deletes, id, 204).await
        }

        async fn update_entity(&self, entity: &CatalogEntity) -> TransportResult<ServiceResponse> {
            self.record(MockCall::Update {
                id: entity.id.clone(),
                active: entity.active,
            });
            self.answer(&self.updates, &entity.id, 200).await
        }

        async fn list_entities(&self) -> TransportResult<Vec<CatalogEntity>> {
            self.record(MockCall::List);
            if let Some(error) = lock(&self.list_error).clone() {
                return Err(error);
            }
            Ok(lock(&self.entities).clone())
        }

        async fn dependent_counts(&self) -> TransportResult<HashMap<EntityId, u64>> {
            self.record(MockCall::DependentCounts);
            lock(&self.counts)
                .clone()
                .unwrap_or_else(|| Ok(HashMap::new()))
        }
    }
}
