//! Domain error types.

use common::InvalidArgumentError;
use event_store::EventStoreError;
use thiserror::Error;

use crate::history::HistoryMismatchError;
use crate::user::UserError;

/// Errors that can occur during domain operations.
#[derive(Debug, Error)]
pub enum DomainError {
    /// An error occurred in the event store.
    #[error("Event store error: {0}")]
    EventStore(#[from] EventStoreError),

    /// A user command was rejected.
    #[error("User error: {0}")]
    User(#[from] UserError),

    /// Command input failed validation.
    #[error("Invalid argument: {0}")]
    InvalidArgument(#[from] InvalidArgumentError),

    /// The stored history contains events of another aggregate.
    #[error("History mismatch: {0}")]
    HistoryMismatch(#[from] HistoryMismatchError),

    /// A stored event carries a type tag the aggregate does not declare.
    #[error("Unhandled event {event_type} for aggregate type {aggregate_type}")]
    UnhandledEvent {
        aggregate_type: &'static str,
        event_type: String,
    },

    /// Aggregate not found.
    #[error("Aggregate not found: {aggregate_type} with id {aggregate_id}")]
    AggregateNotFound {
        aggregate_type: &'static str,
        aggregate_id: String,
    },

    /// An aggregate with this id already has events.
    #[error("Aggregate already exists: {aggregate_type} with id {aggregate_id}")]
    AggregateAlreadyExists {
        aggregate_type: &'static str,
        aggregate_id: String,
    },

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
