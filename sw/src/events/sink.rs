//! Activity sinks - consumers draining the event bus

use std::io::{self, Write};

use chrono::Local;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::types::{ActivityEntry, WorkshopEvent};

/// Anything that wants the textual activity log
///
/// Sinks run on their own task, so a slow sink only ever delays itself.
pub trait ActivitySink: Send + 'static {
    fn record(&mut self, event: &WorkshopEvent);
}

impl<F> ActivitySink for F
where
    F: FnMut(&WorkshopEvent) + Send + 'static,
{
    fn record(&mut self, event: &WorkshopEvent) {
        self(event)
    }
}

/// Output format for [`ConsoleSink`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConsoleFormat {
    /// `HH:MM:SS - message`
    #[default]
    Text,
    /// One [`ActivityEntry`] JSON object per line
    Json,
}

/// Writes the activity log to stdout
#[derive(Debug, Default)]
pub struct ConsoleSink {
    format: ConsoleFormat,
}

impl ConsoleSink {
    pub fn new(format: ConsoleFormat) -> Self {
        Self { format }
    }

    /// Render one line without the trailing newline
    pub fn render(&self, event: &WorkshopEvent) -> String {
        match self.format {
            ConsoleFormat::Text => format!("{} - {}", Local::now().format("%H:%M:%S"), event),
            ConsoleFormat::Json => serde_json::to_string(&ActivityEntry::new(event.clone()))
                .unwrap_or_else(|e| format!("{{\"error\":\"{}\"}}", e)),
        }
    }
}

impl ActivitySink for ConsoleSink {
    fn record(&mut self, event: &WorkshopEvent) {
        let line = self.render(event);
        let mut stdout = io::stdout().lock();
        if let Err(e) = writeln!(stdout, "{}", line) {
            debug!(error = %e, "ConsoleSink::record: stdout closed");
        }
    }
}

/// Drain `rx` into `sink` on a background task until every sender is gone
pub fn spawn_activity_sink<S: ActivitySink>(mut rx: broadcast::Receiver<WorkshopEvent>, mut sink: S) -> JoinHandle<()> {
    tokio::spawn(async move {
        debug!("spawn_activity_sink: sink started");
        loop {
            match rx.recv().await {
                Ok(event) => sink.record(&event),
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!(missed = n, "ActivitySink: lagged behind, missed events");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    debug!("ActivitySink: channel closed, shutting down");
                    break;
                }
            }
        }
    })
}
