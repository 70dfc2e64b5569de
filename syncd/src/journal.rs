//! Append-only journal of notable events.
//!
//! One tab-separated line per entry: timestamp, project name, text. The
//! file is only ever appended to and is never read back by this system;
//! it exists for manual remediation when an update fails. Writes are
//! best-effort: a failure is reported through `tracing` and dropped rather
//! than propagated into a processing loop.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::PathBuf;

use chrono::Local;
use tracing::warn;

/// Handle onto the journal file.
#[derive(Debug, Clone)]
pub struct Journal {
    path: PathBuf,
}

impl Journal {
    /// Creates a journal that appends to the given path. The file and its
    /// parent directory are created on first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Appends one timestamped line. Best-effort.
    pub fn record(&self, project: &str, text: &str) {
        if let Err(error) = self.append(project, text) {
            warn!(
                path = %self.path.display(),
                %error,
                "Failed to append journal line"
            );
        }
    }

    fn append(&self, project: &str, text: &str) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S%.6f");
        writeln!(file, "{timestamp}\t{project}\t{text}")
    }
}
