//! Command handling infrastructure.

use std::marker::PhantomData;

use common::AggregateId;
use event_store::{AppendOptions, EventEnvelope, EventStore, EventStoreExt, Version};

use crate::aggregate::{Aggregate, DomainEvent};
use crate::bus::{EventBus, InMemoryEventBus};
use crate::error::DomainError;
use crate::history::AggregateHistory;

/// Result of command execution.
#[derive(Debug)]
pub struct CommandResult<A: Aggregate> {
    /// The aggregate after applying the new events.
    pub aggregate: A,

    /// The events that were recorded, stored and published.
    pub events: Vec<A::Event>,

    /// The new version of the aggregate after the command.
    pub new_version: Version,
}

/// Trait for commands that can be executed against an aggregate.
///
/// Commands represent an intention to perform an action. They may be rejected
/// if the aggregate's current state doesn't allow the action.
pub trait Command: Send + Sync {
    /// The type of aggregate this command targets.
    type Aggregate: Aggregate;

    /// Returns the ID of the aggregate this command targets.
    fn aggregate_id(&self) -> AggregateId;
}

/// Handler for executing commands against aggregates.
///
/// The handler is responsible for:
/// 1. Loading the aggregate history from the event store and replaying it
/// 2. Running the command, which records events on a staging bus
/// 3. Persisting the recorded events to the event store
/// 4. Forwarding the persisted events to the outgoing bus
///
/// A rejected command stores and publishes nothing.
pub struct CommandHandler<S, A, B>
where
    S: EventStore,
    A: Aggregate,
    B: EventBus<A::Event>,
{
    store: S,
    bus: B,
    _phantom: PhantomData<A>,
}

impl<S, A, B> CommandHandler<S, A, B>
where
    S: EventStore,
    A: Aggregate,
    B: EventBus<A::Event>,
{
    /// Creates a new command handler over an event store and an outgoing bus.
    pub fn new(store: S, bus: B) -> Self {
        Self {
            store,
            bus,
            _phantom: PhantomData,
        }
    }

    /// Returns a reference to the underlying event store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Returns a reference to the outgoing event bus.
    pub fn bus(&self) -> &B {
        &self.bus
    }

    /// Loads the history of an aggregate, or None if it has no events.
    pub async fn load_history(
        &self,
        aggregate_id: AggregateId,
    ) -> Result<Option<AggregateHistory<A::Event>>, DomainError> {
        Ok(self
            .load_versioned(aggregate_id)
            .await?
            .map(|(history, _)| history))
    }

    /// Loads an aggregate by replaying its history.
    pub async fn load(&self, aggregate_id: AggregateId) -> Result<A, DomainError> {
        self.load_existing(aggregate_id)
            .await?
            .ok_or_else(|| not_found::<A>(aggregate_id))
    }

    /// Loads an aggregate, returning None if it doesn't exist.
    pub async fn load_existing(&self, aggregate_id: AggregateId) -> Result<Option<A>, DomainError> {
        Ok(self
            .load_history(aggregate_id)
            .await?
            .map(A::reconstitute_from))
    }

    /// Runs a factory command that brings a new aggregate into existence.
    ///
    /// Fails with `AggregateAlreadyExists` if the id already has events.
    pub async fn create<F>(
        &self,
        aggregate_id: AggregateId,
        factory: F,
    ) -> Result<CommandResult<A>, DomainError>
    where
        F: FnOnce(&dyn EventBus<A::Event>) -> Result<A, A::Error>,
        DomainError: From<A::Error>,
    {
        if self.store.aggregate_exists(aggregate_id).await? {
            return Err(DomainError::AggregateAlreadyExists {
                aggregate_type: A::aggregate_type(),
                aggregate_id: aggregate_id.to_string(),
            });
        }

        let staging = InMemoryEventBus::new();
        let aggregate = self.run(aggregate_id, || factory(&staging))?;
        self.commit(aggregate, Version::initial(), staging.drain())
            .await
    }

    /// Executes a command against an existing aggregate and persists the
    /// events it records.
    ///
    /// The command function receives the replayed aggregate and a bus to
    /// record on; it either records events or returns an error.
    pub async fn execute<F>(
        &self,
        aggregate_id: AggregateId,
        command_fn: F,
    ) -> Result<CommandResult<A>, DomainError>
    where
        F: FnOnce(&mut A, &dyn EventBus<A::Event>) -> Result<(), A::Error>,
        DomainError: From<A::Error>,
    {
        let (history, current_version) = self
            .load_versioned(aggregate_id)
            .await?
            .ok_or_else(|| not_found::<A>(aggregate_id))?;
        let mut aggregate = A::reconstitute_from(history);

        let staging = InMemoryEventBus::new();
        self.run(aggregate_id, || command_fn(&mut aggregate, &staging))?;
        self.commit(aggregate, current_version, staging.drain())
            .await
    }

    fn run<T>(
        &self,
        aggregate_id: AggregateId,
        command: impl FnOnce() -> Result<T, A::Error>,
    ) -> Result<T, DomainError>
    where
        DomainError: From<A::Error>,
    {
        metrics::counter!("domain_commands_total").increment(1);
        command().map_err(|e| {
            metrics::counter!("domain_commands_rejected").increment(1);
            tracing::warn!(
                aggregate_type = A::aggregate_type(),
                %aggregate_id,
                error = %e,
                "command rejected"
            );
            DomainError::from(e)
        })
    }

    async fn commit(
        &self,
        mut aggregate: A,
        current_version: Version,
        events: Vec<A::Event>,
    ) -> Result<CommandResult<A>, DomainError> {
        if events.is_empty() {
            return Ok(CommandResult {
                aggregate,
                events,
                new_version: current_version,
            });
        }

        let envelopes = self.build_envelopes(aggregate.id(), current_version, &events)?;

        // Persist events with optimistic concurrency
        let options = if current_version == Version::initial() {
            AppendOptions::expect_new()
        } else {
            AppendOptions::expect_version(current_version)
        };
        let outcome = self.store.append(envelopes, options).await?;
        aggregate.set_id(outcome.aggregate_id);

        for event in &events {
            tracing::debug!(
                aggregate_type = A::aggregate_type(),
                aggregate_id = %outcome.aggregate_id,
                event_type = event.event_type(),
                "publishing event"
            );
            self.bus.publish(event.clone());
        }
        metrics::counter!("domain_events_recorded").increment(events.len() as u64);

        Ok(CommandResult {
            aggregate,
            events,
            new_version: outcome.version,
        })
    }

    async fn load_versioned(
        &self,
        aggregate_id: AggregateId,
    ) -> Result<Option<(AggregateHistory<A::Event>, Version)>, DomainError> {
        let Some((stored_id, envelopes)) = self.store.load_stream(aggregate_id).await? else {
            return Ok(None);
        };

        let version = envelopes
            .last()
            .map(|e| e.version)
            .unwrap_or(Version::initial());
        let events = envelopes
            .into_iter()
            .map(decode_event::<A>)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Some((AggregateHistory::new(stored_id, events)?, version)))
    }

    /// Builds event envelopes from domain events.
    fn build_envelopes(
        &self,
        aggregate_id: AggregateId,
        current_version: Version,
        events: &[A::Event],
    ) -> Result<Vec<EventEnvelope>, DomainError> {
        let mut envelopes = Vec::with_capacity(events.len());
        let mut version = current_version;

        for event in events {
            version = version.next();
            let envelope = EventEnvelope::builder()
                .aggregate_id(aggregate_id)
                .aggregate_type(A::aggregate_type())
                .event_type(event.event_type())
                .version(version)
                .payload(event)?
                .build()?;
            envelopes.push(envelope);
        }

        Ok(envelopes)
    }
}

fn decode_event<A: Aggregate>(envelope: EventEnvelope) -> Result<A::Event, DomainError> {
    if !A::Event::is_declared(&envelope.event_type) {
        return Err(DomainError::UnhandledEvent {
            aggregate_type: A::aggregate_type(),
            event_type: envelope.event_type,
        });
    }
    Ok(serde_json::from_value(envelope.payload)?)
}

fn not_found<A: Aggregate>(aggregate_id: AggregateId) -> DomainError {
    DomainError::AggregateNotFound {
        aggregate_type: A::aggregate_type(),
        aggregate_id: aggregate_id.to_string(),
    }
}
