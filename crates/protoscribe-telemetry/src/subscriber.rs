use protoscribe_config::TelemetrySettings;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::Context;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// A warning or error captured for the TUI status bar
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    pub level: Level,
    pub target: String,
    pub message: String,
}

impl LogLine {
    pub fn is_error(&self) -> bool {
        self.level == Level::ERROR
    }
}

impl std::fmt::Display for LogLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.level, self.message)
    }
}

/// Forwards WARN and ERROR events over a channel
pub struct ChannelLayer {
    tx: UnboundedSender<LogLine>,
}

impl ChannelLayer {
    pub fn new(tx: UnboundedSender<LogLine>) -> Self {
        Self { tx }
    }
}

/// Collects the message plus any other fields as `key=value`
#[derive(Default)]
struct MessageVisitor {
    message: Option<String>,
    fields: String,
}

impl tracing::field::Visit for MessageVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = Some(format!("{:?}", value));
        } else {
            let _ = write!(self.fields, " {}={:?}", field.name(), value);
        }
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            self.message = Some(value.to_string());
        } else {
            let _ = write!(self.fields, " {}={}", field.name(), value);
        }
    }
}

impl<S> tracing_subscriber::Layer<S> for ChannelLayer
where
    S: Subscriber,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        if !matches!(*metadata.level(), Level::WARN | Level::ERROR) {
            return;
        }

        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);
        let mut message = visitor
            .message
            .unwrap_or_else(|| "(no message)".to_string());
        message.push_str(&visitor.fields);

        // receiver gone means the TUI has exited
        let _ = self.tx.send(LogLine {
            level: *metadata.level(),
            target: metadata.target().to_string(),
            message,
        });
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_level")]
    pub level: String,

    #[serde(default)]
    pub json_output: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            json_output: false,
        }
    }
}

impl From<&TelemetrySettings> for TelemetryConfig {
    fn from(settings: &TelemetrySettings) -> Self {
        Self {
            level: settings.level.clone(),
            json_output: settings.json_output,
        }
    }
}

impl TelemetryConfig {
    /// Raise the level to `debug` for `--verbose`
    pub fn verbose(mut self, verbose: bool) -> Self {
        if verbose {
            self.level = "debug".to_string();
        }
        self
    }

    fn filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.level))
    }
}

fn default_level() -> String {
    "info".to_string()
}

/// Install a stderr subscriber, plain or JSON
pub fn init_subscriber(config: &TelemetryConfig) -> Result<(), TryInitError> {
    let filter = config.filter();

    if config.json_output {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .try_init()
    }
}

/// Install a subscriber that sends warnings and errors to the returned receiver
pub fn init_tui_subscriber(
    config: &TelemetryConfig,
) -> Result<UnboundedReceiver<LogLine>, TryInitError> {
    let (tx, rx) = unbounded_channel();

    tracing_subscriber::registry()
        .with(config.filter())
        .with(ChannelLayer::new(tx))
        .try_init()?;

    Ok(rx)
}
