use std::fmt;
use std::marker::PhantomData;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{EnvFilter, Layer, Registry};

/// One captured event: level, target, rendered message and the other fields
/// in emission order.
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub level: Level,
    pub target: String,
    pub message: String,
    pub fields: Vec<(String, String)>,
}

impl LogEntry {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// In-memory sink for log assertions in tests.
///
/// Clones share the same buffer, so a clone can be handed to a layer while
/// the original is kept for inspection.
#[derive(Debug, Clone, Default)]
pub struct TestLogSubscriber {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl TestLogSubscriber {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<LogEntry> {
        self.lock().clone()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Entries at `level` whose message contains `needle`.
    pub fn find(&self, level: Level, needle: &str) -> Vec<LogEntry> {
        self.lock()
            .iter()
            .filter(|entry| entry.level == level && entry.message.contains(needle))
            .cloned()
            .collect()
    }

    /// Runs `body` with this sink as the thread's default subscriber.
    ///
    /// The subscriber is scoped to the call, so parallel tests never see each
    /// other's events.
    pub fn capture<R>(&self, body: impl FnOnce() -> R) -> R {
        let registry = Registry::default().with(self.clone().into_layer::<Registry>());
        tracing::subscriber::with_default(registry, body)
    }

    pub fn into_layer<S>(self) -> TestLayer<S>
    where
        S: Subscriber + for<'a> LookupSpan<'a>,
    {
        TestLayer {
            sink: self,
            _subscriber: PhantomData,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<LogEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

pub struct TestLayer<S> {
    sink: TestLogSubscriber,
    _subscriber: PhantomData<S>,
}

impl<S> Layer<S> for TestLayer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut recorder = FieldRecorder::default();
        event.record(&mut recorder);

        let metadata = event.metadata();
        self.sink.lock().push(LogEntry {
            level: *metadata.level(),
            target: metadata.target().to_string(),
            message: recorder.message.unwrap_or_default(),
            fields: recorder.fields,
        });
    }
}

#[derive(Default)]
struct FieldRecorder {
    message: Option<String>,
    fields: Vec<(String, String)>,
}

impl FieldRecorder {
    fn push(&mut self, field: &Field, value: String) {
        match field.name() {
            "message" => self.message = Some(value),
            name => self.fields.push((name.to_string(), value)),
        }
    }
}

impl Visit for FieldRecorder {
    // Strings are recorded as-is so assertions don't have to strip quotes.
    fn record_str(&mut self, field: &Field, value: &str) {
        self.push(field, value.to_string());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.push(field, format!("{value:?}"));
    }
}

/// Installs the process-wide formatter.
///
/// `RUST_LOG` wins when set; otherwise `default_filter` (from settings) is
/// used.
pub fn init_logging(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set global default subscriber");
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::{debug, error, info, warn};

    #[test]
    fn capture_records_events_in_order() {
        let logs = TestLogSubscriber::new();
        logs.capture(|| {
            debug!("shuffling");
            info!("game started");
            warn!("action rejected");
            error!("table lock poisoned");
        });

        let levels: Vec<Level> = logs.entries().iter().map(|entry| entry.level).collect();
        assert_eq!(
            levels,
            vec![Level::DEBUG, Level::INFO, Level::WARN, Level::ERROR]
        );
        assert_eq!(logs.entries()[1].message, "game started");
        assert!(logs.entries()[0].target.starts_with("gang_web"));
    }

    #[test]
    fn string_fields_are_unquoted_and_others_use_debug() {
        let logs = TestLogSubscriber::new();
        logs.capture(|| {
            info!(connection_id = "abc123", players = 3, ready = true, "player joined");
        });

        let entry = &logs.find(Level::INFO, "player joined")[0];
        assert_eq!(entry.field("connection_id"), Some("abc123"));
        assert_eq!(entry.field("players"), Some("3"));
        assert_eq!(entry.field("ready"), Some("true"));
        assert_eq!(entry.field("missing"), None);
    }

    #[test]
    fn find_filters_by_level_and_message() {
        let logs = TestLogSubscriber::new();
        logs.capture(|| {
            warn!("dropping message for closed connection");
            debug!("dropping message for unknown connection");
        });

        assert_eq!(logs.find(Level::WARN, "dropping message").len(), 1);
        assert_eq!(logs.find(Level::DEBUG, "unknown").len(), 1);
        assert!(logs.find(Level::ERROR, "dropping").is_empty());
    }

    #[test]
    fn clear_empties_the_shared_buffer() {
        let logs = TestLogSubscriber::new();
        let clone = logs.clone();
        clone.capture(|| info!("first"));
        assert_eq!(logs.entries().len(), 1);

        logs.clear();
        assert!(clone.entries().is_empty());

        logs.capture(|| info!("second"));
        assert_eq!(clone.entries()[0].message, "second");
    }

    #[test]
    fn events_outside_capture_are_not_recorded() {
        let logs = TestLogSubscriber::new();
        info!("before");
        logs.capture(|| info!("inside"));
        info!("after");

        let messages: Vec<String> = logs.entries().into_iter().map(|e| e.message).collect();
        assert_eq!(messages, vec!["inside".to_string()]);
    }
}
