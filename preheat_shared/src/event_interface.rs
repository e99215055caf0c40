use async_trait::async_trait;

/// Source of host events (trigger notifications and telemetry) for the engine.
#[async_trait]
pub trait EventInterface: Send + Sync {
    type Event: Send + Sync;
    async fn send_event(&self, event: Self::Event) -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>>;
    /// `None` once the source is exhausted.
    async fn recv_event(&self) -> Option<Self::Event>;
}
