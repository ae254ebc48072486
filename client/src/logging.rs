use std::fmt::Write as _;
use std::io::Write as _;

use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_log::NormalizeEvent;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{layer::Context, EnvFilter, Layer, Registry};

const DEFAULT_FILTER: &str = "warn,client=info,shared=info";

/// Collects the message of an event plus any extra `key=value` fields.
#[derive(Default)]
struct EventText {
    message: String,
    fields: String,
}

impl Visit for EventText {
    fn record_str(&mut self, field: &Field, value: &str) {
        // `log.*` fields are bridge metadata, already folded into the target.
        if field.name().starts_with("log.") {
            return;
        }
        if field.name() == "message" {
            self.message.push_str(value);
        } else {
            let _ = write!(self.fields, " {}={}", field.name(), value);
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name().starts_with("log.") {
            return;
        }
        if field.name() == "message" {
            let _ = write!(self.message, "{:?}", value);
        } else {
            let _ = write!(self.fields, " {}={:?}", field.name(), value);
        }
    }
}

fn marker(level: &Level) -> &'static str {
    match *level {
        Level::ERROR => "❌ Error:",
        Level::WARN => "⚠️ Warning:",
        Level::INFO => "ℹ️",
        _ => "🔄",
    }
}

/// Formats one event as a terminal line, or `None` when it is filtered out.
/// Events bridged from the `log` facade keep their original target and level.
fn render_line(event: &Event<'_>) -> Option<String> {
    let normalized = event.normalized_metadata();
    let metadata = normalized.as_ref().unwrap_or_else(|| event.metadata());
    let target = metadata.target();

    if target.starts_with("hyper") || target.starts_with("reqwest") {
        return None;
    }
    // Debug chatter only from the game modules.
    if *metadata.level() >= Level::DEBUG && !target.contains("jumble") {
        return None;
    }

    let mut text = EventText::default();
    event.record(&mut text);
    if text.message.is_empty() {
        return None;
    }

    Some(format!(
        "[{}] {} {} - {}{}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
        marker(metadata.level()),
        target,
        text.message,
        text.fields
    ))
}

/// Timestamped one-line events on stderr; stdout belongs to the board.
struct TerminalLayer;

impl<S: Subscriber> Layer<S> for TerminalLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if let Some(line) = render_line(event) {
            let _ = writeln!(std::io::stderr().lock(), "{}", line);
        }
    }
}

/// Installs the global subscriber. `RUST_LOG` overrides the default filter,
/// and events from the `log` facade used by `shared` are forwarded under
/// their own targets.
pub fn setup() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    if let Err(e) = Registry::default().with(env_filter).with(TerminalLayer).try_init() {
        eprintln!("Logging was already initialised: {}", e);
    }
}
