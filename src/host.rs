// src/host.rs - Thin adapter between a printer host and the pre-heat engine
use crate::engine::{PreheatEngine, PreheatOutcome};
use async_trait::async_trait;
use parking_lot::Mutex;
use preheat_shared::event_interface::EventInterface;
use preheat_shared::host_traits::{CommandChannel, CommandError};
use preheat_shared::{FileOrigin, TemperatureSnapshot, TriggerEvent};
use serde::Deserialize;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc::{Receiver, Sender, UnboundedSender, channel};

/// Events delivered by the host, one JSON object per line, e.g.
/// `{"type":"file_selected","origin":"local","path":"benchy.gcode"}`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HostEvent {
    FileSelected { origin: FileOrigin, path: String },
    Connected,
    Startup,
    Temperatures { readings: TemperatureSnapshot },
    SettingsSaved,
}

impl HostEvent {
    pub fn trigger(&self) -> Option<TriggerEvent> {
        match self {
            HostEvent::FileSelected { origin, path } => Some(TriggerEvent::FileSelected {
                origin: *origin,
                path: path.clone(),
            }),
            HostEvent::Connected => Some(TriggerEvent::PrinterConnected),
            HostEvent::Startup => Some(TriggerEvent::ProcessStartup),
            HostEvent::Temperatures { .. } | HostEvent::SettingsSaved => None,
        }
    }
}

/// Engine handle that serialises access for hosts dispatching from several threads.
#[derive(Clone)]
pub struct SharedPreheatEngine {
    inner: Arc<Mutex<PreheatEngine>>,
}

impl SharedPreheatEngine {
    pub fn new(engine: PreheatEngine) -> Self {
        Self {
            inner: Arc::new(Mutex::new(engine)),
        }
    }

    pub fn on_event(&self, event: &TriggerEvent) -> Option<PreheatOutcome> {
        self.inner.lock().on_event(event)
    }

    pub fn observe(&self, snapshot: TemperatureSnapshot) -> TemperatureSnapshot {
        self.inner.lock().observe(snapshot)
    }

    pub fn reload_settings(&self) {
        self.inner.lock().reload_settings();
    }

    /// Run the engine operation matching `event`.
    pub fn dispatch(&self, event: HostEvent) -> Option<PreheatOutcome> {
        match event {
            HostEvent::Temperatures { readings } => {
                self.observe(readings);
                None
            }
            HostEvent::SettingsSaved => {
                self.reload_settings();
                None
            }
            other => other.trigger().and_then(|trigger| self.on_event(&trigger)),
        }
    }

    /// Run `f` with exclusive access to the engine.
    pub fn with_engine<T>(&self, f: impl FnOnce(&mut PreheatEngine) -> T) -> T {
        f(&mut self.inner.lock())
    }
}

/// Command channel forwarding G-code to a writer task.
#[derive(Debug, Clone)]
pub struct ChannelCommandSink {
    sender: UnboundedSender<String>,
}

impl ChannelCommandSink {
    pub fn new(sender: UnboundedSender<String>) -> Self {
        Self { sender }
    }
}

impl CommandChannel for ChannelCommandSink {
    fn send(&self, command: &str) -> Result<(), CommandError> {
        tracing::debug!("Printer <- {}", command);
        self.sender.send(command.to_string()).map_err(|_| CommandError::ChannelClosed)
    }
}

/// Tokio-backed host event queue.
pub struct HostEventQueue {
    sender: Mutex<Option<Sender<HostEvent>>>,
    receiver: tokio::sync::Mutex<Receiver<HostEvent>>,
}

impl HostEventQueue {
    pub fn new(buffer: usize) -> Self {
        let (sender, receiver) = channel(buffer);
        Self {
            sender: Mutex::new(Some(sender)),
            receiver: tokio::sync::Mutex::new(receiver),
        }
    }

    /// Stop accepting events; `recv_event` drains what is queued, then yields `None`.
    pub fn close(&self) {
        self.sender.lock().take();
    }

    /// Parse JSON-lines events from `reader` into the queue until EOF, then close it.
    /// Malformed lines are logged and skipped. Returns the number of queued events.
    pub async fn pump_json_lines<R: AsyncBufRead + Unpin>(&self, reader: R) -> usize {
        let mut lines = reader.lines();
        let mut queued = 0;
        loop {
            let line = match lines.next_line().await {
                Ok(Some(line)) => line,
                Ok(None) => break,
                Err(e) => {
                    tracing::error!("Failed to read host event: {}", e);
                    break;
                }
            };
            if line.trim().is_empty() {
                continue;
            }
            let event = match serde_json::from_str::<HostEvent>(&line) {
                Ok(event) => event,
                Err(e) => {
                    tracing::warn!("Skipping malformed host event '{}': {}", line, e);
                    continue;
                }
            };
            if let Err(e) = self.send_event(event).await {
                tracing::error!("Failed to queue host event: {}", e);
                break;
            }
            queued += 1;
        }
        self.close();
        queued
    }
}

#[async_trait]
impl EventInterface for HostEventQueue {
    type Event = HostEvent;

    async fn send_event(&self, event: Self::Event) -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
        let sender = self.sender.lock().clone();
        match sender {
            Some(sender) => sender
                .send(event)
                .await
                .map_err(|e| Box::new(e) as Box<dyn std::error::Error + Send + Sync + 'static>),
            None => Err("host event queue closed".into()),
        }
    }

    async fn recv_event(&self) -> Option<Self::Event> {
        let mut rx = self.receiver.lock().await;
        rx.recv().await
    }
}

/// Feed every event from `events` into the engine until the source is exhausted.
/// Returns the number of events handled.
pub async fn run_dispatcher<E>(engine: &SharedPreheatEngine, events: &E) -> usize
where
    E: EventInterface<Event = HostEvent>,
{
    let mut handled = 0;
    while let Some(event) = events.recv_event().await {
        tracing::debug!("Host event: {:?}", event);
        if let Some(outcome) = engine.dispatch(event) {
            tracing::debug!("Pre-heat outcome: {:?}", outcome);
        }
        handled += 1;
    }
    handled
}
