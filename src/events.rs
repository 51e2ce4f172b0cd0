use crate::error::EventBusError;
use crate::interaction::InteractionMode;
use crate::selection::{OverlayLayout, SelectionSource};
use serde::{Deserialize, Serialize};
use std::time::SystemTime;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Discrete notifications raised by the gesture pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SceneEvent {
    /// The interaction mode changed
    ModeEntered {
        mode: InteractionMode,
        timestamp: SystemTime,
    },
    /// A wave completed; carries the message to show
    BlessingTriggered {
        message: String,
        timestamp: SystemTime,
    },
    /// A pinch resolved to a catalog item
    SelectionChanged {
        index: usize,
        source: SelectionSource,
        layout: OverlayLayout,
        timestamp: SystemTime,
    },
    /// A hand appeared or disappeared
    HandVisibilityChanged {
        visible: bool,
        timestamp: SystemTime,
    },
    /// The landmark source opened, closed or ran dry
    SourceStatusChanged {
        source: String,
        connected: bool,
        timestamp: SystemTime,
    },
    /// A system error occurred in a component
    SystemError { component: String, error: String },
}

impl SceneEvent {
    pub fn mode_entered(mode: InteractionMode) -> Self {
        Self::ModeEntered {
            mode,
            timestamp: SystemTime::now(),
        }
    }

    pub fn blessing(message: impl Into<String>) -> Self {
        Self::BlessingTriggered {
            message: message.into(),
            timestamp: SystemTime::now(),
        }
    }

    pub fn source_status(source: impl Into<String>, connected: bool) -> Self {
        Self::SourceStatusChanged {
            source: source.into(),
            connected,
            timestamp: SystemTime::now(),
        }
    }

    /// Get the timestamp of the event
    pub fn timestamp(&self) -> SystemTime {
        match self {
            SceneEvent::ModeEntered { timestamp, .. } => *timestamp,
            SceneEvent::BlessingTriggered { timestamp, .. } => *timestamp,
            SceneEvent::SelectionChanged { timestamp, .. } => *timestamp,
            SceneEvent::HandVisibilityChanged { timestamp, .. } => *timestamp,
            SceneEvent::SourceStatusChanged { timestamp, .. } => *timestamp,
            SceneEvent::SystemError { .. } => SystemTime::now(),
        }
    }

    /// Get a human-readable description of the event
    pub fn description(&self) -> String {
        match self {
            SceneEvent::ModeEntered { mode, .. } => format!("Entered {} mode", mode),
            SceneEvent::BlessingTriggered { message, .. } => {
                format!("Blessing: {}", message)
            }
            SceneEvent::SelectionChanged { index, source, .. } => {
                format!("Selected item {} ({:?})", index, source)
            }
            SceneEvent::HandVisibilityChanged { visible, .. } => {
                format!("Hand {}", if *visible { "detected" } else { "lost" })
            }
            SceneEvent::SourceStatusChanged {
                source, connected, ..
            } => {
                format!(
                    "Source {} {}",
                    source,
                    if *connected { "connected" } else { "disconnected" }
                )
            }
            SceneEvent::SystemError { component, error } => {
                format!("Error in {}: {}", component, error)
            }
        }
    }

    /// Get the event type as a string for filtering
    pub fn event_type(&self) -> &'static str {
        match self {
            SceneEvent::ModeEntered { .. } => "mode_entered",
            SceneEvent::BlessingTriggered { .. } => "blessing_triggered",
            SceneEvent::SelectionChanged { .. } => "selection_changed",
            SceneEvent::HandVisibilityChanged { .. } => "hand_visibility_changed",
            SceneEvent::SourceStatusChanged { .. } => "source_status_changed",
            SceneEvent::SystemError { .. } => "system_error",
        }
    }
}

/// Event bus for scene notifications using broadcast channels.
///
/// Publishing never blocks, so the pipeline can publish from its frame
/// handler without an async context.
pub struct EventBus {
    sender: broadcast::Sender<SceneEvent>,
    debug_logging: bool,
}

impl EventBus {
    /// Create a new event bus with the specified channel capacity
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            debug_logging: false,
        }
    }

    /// Create a new event bus with debug logging enabled
    pub fn with_debug_logging(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            debug_logging: true,
        }
    }

    /// Subscribe to events and get a receiver
    pub fn subscribe(&self) -> broadcast::Receiver<SceneEvent> {
        self.sender.subscribe()
    }

    /// Subscribe through a filtering receiver
    pub fn receiver(&self, filter: EventFilter, name: impl Into<String>) -> EventReceiver {
        EventReceiver::new(self.sender.subscribe(), filter, name.into())
    }

    /// Publish an event to all subscribers.
    ///
    /// Fails with `PublishFailed` when nobody is subscribed.
    pub fn publish(&self, event: SceneEvent) -> Result<usize, EventBusError> {
        if self.debug_logging {
            debug!("Publishing event: {}", event.description());
        }

        match &event {
            SceneEvent::ModeEntered { mode, .. } => {
                info!("Mode entered: {}", mode);
            }
            SceneEvent::BlessingTriggered { message, .. } => {
                info!("Blessing triggered: {}", message);
            }
            SceneEvent::SystemError { component, error } => {
                error!("System error in {}: {}", component, error);
            }
            SceneEvent::SourceStatusChanged {
                source, connected, ..
            } => {
                if *connected {
                    info!("Landmark source {} connected", source);
                } else {
                    warn!("Landmark source {} disconnected", source);
                }
            }
            _ => {
                if self.debug_logging {
                    debug!("Event: {}", event.description());
                }
            }
        }

        self.sender
            .send(event)
            .map_err(|e| EventBusError::PublishFailed {
                details: e.to_string(),
            })
    }

    /// Get the number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Check if there are any active subscribers
    pub fn has_subscribers(&self) -> bool {
        self.sender.receiver_count() > 0
    }
}

impl Clone for EventBus {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
            debug_logging: self.debug_logging,
        }
    }
}

/// Event filter for selective event handling
#[derive(Debug, Clone)]
pub enum EventFilter {
    /// Accept all events
    All,
    /// Accept only specific event types
    EventTypes(Vec<&'static str>),
    /// Accept errors from specific components
    Components(Vec<String>),
    /// Custom filter function
    Custom(fn(&SceneEvent) -> bool),
}

impl EventFilter {
    /// Check if an event passes this filter
    pub fn matches(&self, event: &SceneEvent) -> bool {
        match self {
            EventFilter::All => true,
            EventFilter::EventTypes(types) => types.contains(&event.event_type()),
            EventFilter::Components(components) => {
                if let SceneEvent::SystemError { component, .. } = event {
                    components.contains(component)
                } else {
                    false
                }
            }
            EventFilter::Custom(filter_fn) => filter_fn(event),
        }
    }
}

/// Event receiver with filtering
pub struct EventReceiver {
    receiver: broadcast::Receiver<SceneEvent>,
    filter: EventFilter,
    name: String,
}

impl EventReceiver {
    pub fn new(
        receiver: broadcast::Receiver<SceneEvent>,
        filter: EventFilter,
        name: String,
    ) -> Self {
        Self {
            receiver,
            filter,
            name,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Receive the next filtered event
    pub async fn recv(&mut self) -> Result<SceneEvent, EventBusError> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => {
                    if self.filter.matches(&event) {
                        debug!(
                            "Receiver '{}' received event: {}",
                            self.name,
                            event.description()
                        );
                        return Ok(event);
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!("Receiver '{}' lagged behind by {} events", self.name, n);
                    return Err(EventBusError::Lagged(n));
                }
                Err(broadcast::error::RecvError::Closed) => {
                    debug!("Event bus closed for receiver '{}'", self.name);
                    return Err(EventBusError::ChannelClosed);
                }
            }
        }
    }

    /// Try to receive an event without blocking
    pub fn try_recv(&mut self) -> Result<Option<SceneEvent>, EventBusError> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => {
                    if self.filter.matches(&event) {
                        return Ok(Some(event));
                    }
                }
                Err(broadcast::error::TryRecvError::Empty) => {
                    return Ok(None);
                }
                Err(broadcast::error::TryRecvError::Lagged(n)) => {
                    warn!("Receiver '{}' lagged behind by {} events", self.name, n);
                    return Err(EventBusError::Lagged(n));
                }
                Err(broadcast::error::TryRecvError::Closed) => {
                    debug!("Event bus closed for receiver '{}'", self.name);
                    return Err(EventBusError::ChannelClosed);
                }
            }
        }
    }
}

/// Event handler trait for components that react to scene events
#[async_trait::async_trait]
pub trait EventHandler: Send + Sync {
    /// Handle an incoming event
    async fn handle_event(&mut self, event: SceneEvent) -> Result<(), EventBusError>;

    /// Get the name of this handler for logging
    fn handler_name(&self) -> &str;

    /// Get the event filter for this handler
    fn event_filter(&self) -> EventFilter;
}

/// Feed events from `receiver` to `handler` until cancelled or the bus
/// closes.
///
/// Lag is logged and skipped; handler errors are logged and do not stop the
/// loop.
pub async fn run_handler<H: EventHandler>(
    mut receiver: EventReceiver,
    mut handler: H,
    cancel: CancellationToken,
) -> H {
    info!("Event handler '{}' started", handler.handler_name());

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            received = receiver.recv() => match received {
                Ok(event) => {
                    if let Err(e) = handler.handle_event(event).await {
                        warn!("Handler '{}' failed: {}", handler.handler_name(), e);
                    }
                }
                Err(EventBusError::Lagged(_)) => continue,
                Err(_) => break,
            },
        }
    }

    debug!("Event handler '{}' stopped", handler.handler_name());
    handler
}

/// Event counters for monitoring and debugging
#[derive(Debug, Default, Clone)]
pub struct EventMetrics {
    pub total_events: u64,
    pub events_by_type: std::collections::HashMap<&'static str, u64>,
    pub errors: u64,
    pub last_event_time: Option<SystemTime>,
}

impl EventMetrics {
    /// Record an event
    pub fn record_event(&mut self, event: &SceneEvent) {
        self.total_events += 1;
        *self.events_by_type.entry(event.event_type()).or_insert(0) += 1;
        if matches!(event, SceneEvent::SystemError { .. }) {
            self.errors += 1;
        }
        self.last_event_time = Some(event.timestamp());
    }

    pub fn count(&self, event_type: &str) -> u64 {
        self.events_by_type.get(event_type).copied().unwrap_or(0)
    }

    /// Reset all metrics
    pub fn reset(&mut self) {
        self.total_events = 0;
        self.events_by_type.clear();
        self.errors = 0;
        self.last_event_time = None;
    }
}

/// Convenience handlers for common event handling patterns
pub mod patterns {
    use super::*;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    /// Create a simple event handler that logs all events
    pub fn create_logging_handler(name: String) -> impl EventHandler {
        LoggingHandler { name }
    }

    /// Create an event handler that collects metrics
    pub fn create_metrics_handler(
        metrics: Arc<Mutex<EventMetrics>>,
        name: String,
    ) -> impl EventHandler {
        MetricsHandler { metrics, name }
    }

    struct LoggingHandler {
        name: String,
    }

    #[async_trait::async_trait]
    impl EventHandler for LoggingHandler {
        async fn handle_event(&mut self, event: SceneEvent) -> Result<(), EventBusError> {
            info!("[{}] {}", self.name, event.description());
            Ok(())
        }

        fn handler_name(&self) -> &str {
            &self.name
        }

        fn event_filter(&self) -> EventFilter {
            EventFilter::All
        }
    }

    struct MetricsHandler {
        metrics: Arc<Mutex<EventMetrics>>,
        name: String,
    }

    #[async_trait::async_trait]
    impl EventHandler for MetricsHandler {
        async fn handle_event(&mut self, event: SceneEvent) -> Result<(), EventBusError> {
            let mut metrics = self.metrics.lock().await;
            metrics.record_event(&event);
            Ok(())
        }

        fn handler_name(&self) -> &str {
            &self.name
        }

        fn event_filter(&self) -> EventFilter {
            EventFilter::All
        }
    }
}
