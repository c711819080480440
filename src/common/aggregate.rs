use crate::common::DomainEvent;

/// State owned by a single writer that records what happened to it as events.
pub trait AggregateRoot: Send + Sync {
    type Event: DomainEvent;

    fn aggregate_id(&self) -> &str;
    fn version(&self) -> u64;

    /// Get uncommitted events
    fn uncommitted_events(&self) -> &[Self::Event];

    /// Hand over uncommitted events for publishing, leaving the list empty
    fn take_uncommitted_events(&mut self) -> Vec<Self::Event>;

    /// Add a new event to the uncommitted events list
    fn add_event(&mut self, event: Self::Event);
}
