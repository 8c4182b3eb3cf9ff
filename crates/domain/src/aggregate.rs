//! Core aggregate and domain event traits.

use common::AggregateId;
use serde::{Serialize, de::DeserializeOwned};

use crate::bus::EventBus;
use crate::history::AggregateHistory;

/// Trait for domain events.
///
/// Domain events represent facts that have happened in the domain.
/// They are immutable and should be named in past tense.
pub trait DomainEvent: Serialize + DeserializeOwned + Send + Sync + Clone + std::fmt::Debug {
    /// Every type tag this event family can carry.
    ///
    /// Stored events with a tag outside this list are refused on load.
    const EVENT_TYPES: &'static [&'static str];

    /// Returns the declared type tag of this event.
    fn event_type(&self) -> &'static str;

    /// Returns the identity of the aggregate this event happened to.
    fn aggregate_id(&self) -> AggregateId;

    /// Returns true if `event_type` is one of [`Self::EVENT_TYPES`].
    fn is_declared(event_type: &str) -> bool {
        Self::EVENT_TYPES.contains(&event_type)
    }
}

/// Trait for aggregates in an event-sourced system.
///
/// An aggregate is a consistency boundary whose state is never assigned
/// directly. Commands check invariants and record events; `apply` folds an
/// event into state. Rebuilding from history and handling a command both go
/// through the same `apply`.
pub trait Aggregate: Send + Sync + Sized {
    /// The type of events this aggregate produces and consumes.
    type Event: DomainEvent;

    /// The type of errors this aggregate's commands can produce.
    type Error: std::error::Error + Send + Sync;

    /// Returns the aggregate type name.
    ///
    /// Used for event store organization and routing.
    fn aggregate_type() -> &'static str;

    /// Creates an aggregate with the given identity and every derived field
    /// at its empty default.
    fn blank(id: AggregateId) -> Self;

    /// Returns the aggregate's identity.
    fn id(&self) -> AggregateId;

    /// Replaces the identity with the one the store recorded.
    ///
    /// Called by the command handler after an append so the surrogate id
    /// assigned by the store becomes visible.
    fn set_id(&mut self, id: AggregateId);

    /// Applies an event to the aggregate, updating its state.
    ///
    /// This method must be pure and deterministic:
    /// - Given the same state and event, it must always produce the same new state
    /// - It must not have side effects
    /// - It must not fail (events represent facts that have happened)
    fn apply(&mut self, event: Self::Event);

    /// Applies multiple events in sequence.
    fn apply_events(&mut self, events: impl IntoIterator<Item = Self::Event>) {
        for event in events {
            self.apply(event);
        }
    }

    /// Rebuilds an aggregate by folding its full history, in order, over a
    /// blank instance. Nothing is published.
    fn reconstitute_from(history: AggregateHistory<Self::Event>) -> Self {
        let mut aggregate = Self::blank(history.aggregate_id());
        aggregate.apply_events(history);
        aggregate
    }

    /// Applies a new event locally, then publishes it.
    ///
    /// State is updated first so that anything reacting to the published
    /// event sees an aggregate that already reflects it.
    fn record_that<B>(&mut self, event: Self::Event, bus: &B)
    where
        B: EventBus<Self::Event> + ?Sized,
    {
        self.apply(event.clone());
        bus.publish(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::InMemoryEventBus;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, Serialize, Deserialize)]
    enum CounterEvent {
        Incremented { id: AggregateId, by: i32 },
        Reset { id: AggregateId },
    }

    impl DomainEvent for CounterEvent {
        const EVENT_TYPES: &'static [&'static str] = &["CounterIncremented", "CounterReset"];

        fn event_type(&self) -> &'static str {
            match self {
                CounterEvent::Incremented { .. } => "CounterIncremented",
                CounterEvent::Reset { .. } => "CounterReset",
            }
        }

        fn aggregate_id(&self) -> AggregateId {
            match self {
                CounterEvent::Incremented { id, .. } | CounterEvent::Reset { id } => *id,
            }
        }
    }

    #[derive(Debug)]
    struct Counter {
        id: AggregateId,
        value: i32,
    }

    #[derive(Debug, thiserror::Error)]
    #[error("counter error")]
    struct CounterError;

    impl Aggregate for Counter {
        type Event = CounterEvent;
        type Error = CounterError;

        fn aggregate_type() -> &'static str {
            "Counter"
        }

        fn blank(id: AggregateId) -> Self {
            Self { id, value: 0 }
        }

        fn id(&self) -> AggregateId {
            self.id
        }

        fn set_id(&mut self, id: AggregateId) {
            self.id = id;
        }

        fn apply(&mut self, event: Self::Event) {
            match event {
                CounterEvent::Incremented { by, .. } => self.value += by,
                CounterEvent::Reset { .. } => self.value = 0,
            }
        }
    }

    #[test]
    fn test_apply_events() {
        let id = AggregateId::generate();
        let mut counter = Counter::blank(id);
        counter.apply_events(vec![
            CounterEvent::Incremented { id, by: 2 },
            CounterEvent::Incremented { id, by: 40 },
        ]);
        assert_eq!(counter.value, 42);
    }

    #[test]
    fn test_reconstitute_keeps_history_identity() {
        let id = AggregateId::generate().with_surrogate(3).unwrap();
        let history = AggregateHistory::new(
            id,
            vec![
                CounterEvent::Incremented { id, by: 5 },
                CounterEvent::Reset { id },
                CounterEvent::Incremented { id, by: 1 },
            ],
        )
        .unwrap();

        let counter = Counter::reconstitute_from(history);
        assert_eq!(counter.value, 1);
        assert_eq!(counter.id().surrogate_id(), Some(3));
    }

    #[test]
    fn test_record_that_applies_then_publishes() {
        let id = AggregateId::generate();
        let bus = InMemoryEventBus::new();
        let mut counter = Counter::blank(id);

        counter.record_that(CounterEvent::Incremented { id, by: 7 }, &bus);

        assert_eq!(counter.value, 7);
        let published = bus.published();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].event_type(), "CounterIncremented");
    }

    #[test]
    fn test_declared_event_types() {
        assert!(CounterEvent::is_declared("CounterReset"));
        assert!(!CounterEvent::is_declared("CounterDeleted"));
    }
}
