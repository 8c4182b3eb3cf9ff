use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{
    AggregateId, EventEnvelope, EventStoreError, Result, Version,
    store::{AppendOptions, AppendOutcome, EventStore, validate_events_for_append},
};

/// One aggregate's stored history.
#[derive(Debug, Clone)]
struct Stream {
    /// Identity as stored, surrogate included.
    aggregate_id: AggregateId,
    events: Vec<EventEnvelope>,
}

impl Stream {
    fn version(&self) -> Version {
        self.events
            .last()
            .map(|e| e.version)
            .unwrap_or(Version::initial())
    }
}

#[derive(Debug, Default)]
struct Inner {
    streams: HashMap<AggregateId, Stream>,
    last_surrogate: i64,
}

/// In-memory event store implementation for tests and development.
///
/// Surrogate ids are handed out sequentially, starting at 1, the first time
/// an aggregate's events are appended.
#[derive(Clone, Default)]
pub struct InMemoryEventStore {
    inner: Arc<RwLock<Inner>>,
}

impl InMemoryEventStore {
    /// Creates a new empty in-memory event store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the total number of events stored.
    pub async fn event_count(&self) -> usize {
        let inner = self.inner.read().await;
        inner.streams.values().map(|s| s.events.len()).sum()
    }

    /// Clears all events. Surrogate numbering continues where it left off.
    pub async fn clear(&self) {
        self.inner.write().await.streams.clear();
    }
}

#[async_trait]
impl EventStore for InMemoryEventStore {
    async fn append(
        &self,
        events: Vec<EventEnvelope>,
        options: AppendOptions,
    ) -> Result<AppendOutcome> {
        validate_events_for_append(&events)?;

        let first_event = &events[0];
        let aggregate_id = first_event.aggregate_id;
        let first_new_version = first_event.version;

        let mut guard = self.inner.write().await;
        let inner = &mut *guard;

        let current_version = inner
            .streams
            .get(&aggregate_id)
            .map(Stream::version)
            .unwrap_or(Version::initial());

        // Check expected version if specified
        if let Some(expected) = options.expected_version
            && current_version != expected
        {
            return Err(EventStoreError::ConcurrencyConflict {
                aggregate_id,
                expected,
                actual: current_version,
            });
        }

        // The batch must continue the stream exactly
        if first_new_version != current_version.next() {
            return Err(EventStoreError::ConcurrencyConflict {
                aggregate_id,
                expected: options.expected_version.unwrap_or(current_version),
                actual: current_version,
            });
        }

        let existing_id = inner.streams.get(&aggregate_id).map(|s| s.aggregate_id);
        let stored_id = match existing_id {
            Some(stored_id) => stored_id,
            None => {
                let surrogate = inner.last_surrogate + 1;
                let stored_id = aggregate_id
                    .with_surrogate(surrogate)
                    .map_err(|e| EventStoreError::InvalidAppend(e.to_string()))?;
                inner.last_surrogate = surrogate;
                stored_id
            }
        };

        let appended = events.len();
        let stream = inner.streams.entry(aggregate_id).or_insert_with(|| Stream {
            aggregate_id: stored_id,
            events: Vec::new(),
        });
        stream.events.extend(events.into_iter().map(|mut e| {
            e.aggregate_id = stored_id;
            e
        }));
        let version = stream.version();

        metrics::counter!("event_store_events_appended").increment(appended as u64);
        tracing::debug!(
            aggregate_id = %stored_id,
            surrogate_id = ?stored_id.surrogate_id(),
            %version,
            appended,
            "appended events"
        );

        Ok(AppendOutcome {
            aggregate_id: stored_id,
            version,
        })
    }

    async fn get_events_for_aggregate(
        &self,
        aggregate_id: AggregateId,
    ) -> Result<Vec<EventEnvelope>> {
        let inner = self.inner.read().await;
        let mut events = inner
            .streams
            .get(&aggregate_id)
            .map(|s| s.events.clone())
            .unwrap_or_default();
        events.sort_by_key(|e| e.version);
        Ok(events)
    }

    async fn get_aggregate_version(&self, aggregate_id: AggregateId) -> Result<Option<Version>> {
        let inner = self.inner.read().await;
        Ok(inner.streams.get(&aggregate_id).map(Stream::version))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::EventStoreExt;

    fn create_test_event(
        aggregate_id: AggregateId,
        version: Version,
        event_type: &str,
    ) -> EventEnvelope {
        EventEnvelope::builder()
            .aggregate_id(aggregate_id)
            .aggregate_type("User")
            .event_type(event_type)
            .version(version)
            .payload_raw(serde_json::json!({"test": true}))
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn append_single_event() {
        let store = InMemoryEventStore::new();
        let aggregate_id = AggregateId::generate();
        let event = create_test_event(aggregate_id, Version::first(), "UserRegistered");

        let outcome = store
            .append(vec![event], AppendOptions::expect_new())
            .await
            .unwrap();
        assert_eq!(outcome.version, Version::first());
        assert_eq!(outcome.aggregate_id, aggregate_id);

        let events = store.get_events_for_aggregate(aggregate_id).await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(store.event_count().await, 1);
    }

    #[tokio::test]
    async fn append_multiple_events() {
        let store = InMemoryEventStore::new();
        let aggregate_id = AggregateId::generate();

        let events = vec![
            create_test_event(aggregate_id, Version::new(1), "UserRegistered"),
            create_test_event(aggregate_id, Version::new(2), "UserActivated"),
            create_test_event(aggregate_id, Version::new(3), "UserEnabled"),
        ];

        let outcome = store
            .append(events, AppendOptions::expect_new())
            .await
            .unwrap();
        assert_eq!(outcome.version, Version::new(3));

        let stored = store.get_events_for_aggregate(aggregate_id).await.unwrap();
        let types: Vec<_> = stored.iter().map(|e| e.event_type.as_str()).collect();
        assert_eq!(types, ["UserRegistered", "UserActivated", "UserEnabled"]);
    }

    #[tokio::test]
    async fn first_append_assigns_surrogate_ids_in_sequence() {
        let store = InMemoryEventStore::new();
        let id1 = AggregateId::generate();
        let id2 = AggregateId::generate();

        let first = store
            .append(
                vec![create_test_event(id1, Version::first(), "UserRegistered")],
                AppendOptions::expect_new(),
            )
            .await
            .unwrap();
        let second = store
            .append(
                vec![create_test_event(id2, Version::first(), "UserRegistered")],
                AppendOptions::expect_new(),
            )
            .await
            .unwrap();
        let again = store
            .append(
                vec![create_test_event(id1, Version::new(2), "UserActivated")],
                AppendOptions::expect_version(Version::first()),
            )
            .await
            .unwrap();

        assert_eq!(first.aggregate_id.surrogate_id(), Some(1));
        assert_eq!(second.aggregate_id.surrogate_id(), Some(2));
        assert_eq!(again.aggregate_id.surrogate_id(), Some(1));
    }

    #[tokio::test]
    async fn stored_events_carry_stored_identity() {
        let store = InMemoryEventStore::new();
        let aggregate_id = AggregateId::generate();
        store
            .append(
                vec![create_test_event(aggregate_id, Version::first(), "UserRegistered")],
                AppendOptions::expect_new(),
            )
            .await
            .unwrap();

        let (stored_id, events) = store.load_stream(aggregate_id).await.unwrap().unwrap();
        assert_eq!(stored_id.surrogate_id(), Some(1));
        assert!(events.iter().all(|e| e.aggregate_id.surrogate_id() == Some(1)));
    }

    #[tokio::test]
    async fn load_stream_returns_none_for_unknown_aggregate() {
        let store = InMemoryEventStore::new();
        let result = store.load_stream(AggregateId::generate()).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn concurrency_conflict_on_wrong_version() {
        let store = InMemoryEventStore::new();
        let aggregate_id = AggregateId::generate();

        let event1 = create_test_event(aggregate_id, Version::first(), "UserRegistered");
        store
            .append(vec![event1], AppendOptions::expect_new())
            .await
            .unwrap();

        // Try to append with wrong expected version
        let event2 = create_test_event(aggregate_id, Version::new(2), "UserActivated");
        let result = store
            .append(
                vec![event2],
                AppendOptions::expect_version(Version::initial()),
            )
            .await;

        assert!(matches!(
            result,
            Err(EventStoreError::ConcurrencyConflict { .. })
        ));
        assert_eq!(store.event_count().await, 1);
    }

    #[tokio::test]
    async fn version_gap_is_a_conflict() {
        let store = InMemoryEventStore::new();
        let aggregate_id = AggregateId::generate();

        let result = store
            .append(
                vec![create_test_event(aggregate_id, Version::new(2), "UserActivated")],
                AppendOptions::new(),
            )
            .await;

        assert!(matches!(
            result,
            Err(EventStoreError::ConcurrencyConflict { .. })
        ));
        assert!(!store.aggregate_exists(aggregate_id).await.unwrap());
    }

    #[tokio::test]
    async fn append_with_expected_version_succeeds() {
        let store = InMemoryEventStore::new();
        let aggregate_id = AggregateId::generate();

        let event1 = create_test_event(aggregate_id, Version::first(), "UserRegistered");
        store
            .append(vec![event1], AppendOptions::expect_new())
            .await
            .unwrap();

        let event2 = create_test_event(aggregate_id, Version::new(2), "UserActivated");
        let result = store
            .append_event(event2, AppendOptions::expect_version(Version::first()))
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn get_aggregate_version() {
        let store = InMemoryEventStore::new();
        let aggregate_id = AggregateId::generate();

        // No events yet
        let version = store.get_aggregate_version(aggregate_id).await.unwrap();
        assert!(version.is_none());

        let events = vec![
            create_test_event(aggregate_id, Version::new(1), "UserRegistered"),
            create_test_event(aggregate_id, Version::new(2), "UserActivated"),
        ];
        store.append(events, AppendOptions::new()).await.unwrap();

        let version = store.get_aggregate_version(aggregate_id).await.unwrap();
        assert_eq!(version, Some(Version::new(2)));
    }

    #[tokio::test]
    async fn clear_removes_events() {
        let store = InMemoryEventStore::new();
        let aggregate_id = AggregateId::generate();
        store
            .append(
                vec![create_test_event(aggregate_id, Version::first(), "UserRegistered")],
                AppendOptions::new(),
            )
            .await
            .unwrap();

        store.clear().await;
        assert_eq!(store.event_count().await, 0);
    }
}
