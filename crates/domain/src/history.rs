//! Ordered event history of a single aggregate.

use common::AggregateId;
use thiserror::Error;

use crate::aggregate::DomainEvent;

/// An event in a history belongs to a different aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Event {position} in history of {expected} belongs to aggregate {found}")]
pub struct HistoryMismatchError {
    pub expected: AggregateId,
    pub found: AggregateId,
    pub position: usize,
}

/// The ordered events of one aggregate, used for replay.
///
/// The constructor checks that every event belongs to the declared identity.
/// Events are kept in the order given, which must be the order in which they
/// happened. Iteration consumes the history; replaying again needs a fresh
/// history.
#[derive(Debug, Clone)]
pub struct AggregateHistory<E> {
    aggregate_id: AggregateId,
    events: Vec<E>,
}

impl<E: DomainEvent> AggregateHistory<E> {
    /// Creates a history, failing if any event is for another aggregate.
    pub fn new(aggregate_id: AggregateId, events: Vec<E>) -> Result<Self, HistoryMismatchError> {
        if let Some((position, event)) = events
            .iter()
            .enumerate()
            .find(|(_, e)| e.aggregate_id() != aggregate_id)
        {
            return Err(HistoryMismatchError {
                expected: aggregate_id,
                found: event.aggregate_id(),
                position,
            });
        }

        Ok(Self {
            aggregate_id,
            events,
        })
    }

    /// Returns the identity the history belongs to.
    pub fn aggregate_id(&self) -> AggregateId {
        self.aggregate_id
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Consumes the history, yielding its events in order.
    pub fn events(self) -> std::vec::IntoIter<E> {
        self.events.into_iter()
    }
}

impl<E: DomainEvent> IntoIterator for AggregateHistory<E> {
    type Item = E;
    type IntoIter = std::vec::IntoIter<E>;

    fn into_iter(self) -> Self::IntoIter {
        self.events()
    }
}
