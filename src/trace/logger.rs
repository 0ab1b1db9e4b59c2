use std::{fs::File, fs::OpenOptions, io::Write, path::Path, sync::Mutex};

use serde::Serialize;
use tracing::warn;

use crate::trace::event::{RunSummary, TraceEvent};

/// JSONL sink for autofill decisions: one line per frame considered and a
/// closing [`RunSummary`] per `do_autofill` call. A trace file that cannot
/// be opened leaves the logger disabled.
pub struct TraceLogger {
    file: Option<Mutex<File>>,
}

impl TraceLogger {
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match OpenOptions::new().create(true).append(true).open(path) {
            Ok(f) => Self {
                file: Some(Mutex::new(f)),
            },
            Err(e) => {
                warn!(path = %path.display(), error = %e, "autofill trace disabled");
                Self { file: None }
            }
        }
    }

    /// Logger that records nothing.
    pub fn disabled() -> Self {
        Self { file: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.file.is_some()
    }

    pub fn log(&self, event: &TraceEvent) {
        self.append(event);
    }

    pub fn log_summary(&self, summary: &RunSummary) {
        self.append(summary);
    }

    fn append<T: Serialize>(&self, record: &T) {
        let Some(file) = &self.file else {
            return;
        };

        let line = match serde_json::to_string(record) {
            Ok(line) => line,
            Err(e) => {
                warn!(error = %e, "unserializable trace record dropped");
                return;
            }
        };

        match file.lock() {
            Ok(mut file) => {
                if let Err(e) = writeln!(file, "{}", line) {
                    warn!(error = %e, "trace write failed");
                }
            }
            Err(e) => warn!(error = %e, "trace file lock poisoned"),
        }
    }
}
