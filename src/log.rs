use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use chrono::Local;

/// Append-only run log mirrored to stdout.
///
/// Every line is `[YYYY-MM-DD HH:MM:SS] message`. A log file that cannot be
/// opened or written is reported on stdout and otherwise ignored.
pub struct RunLog {
    path: PathBuf,
}

impl RunLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        RunLog { path: path.into() }
    }

    pub fn line(&self, message: impl AsRef<str>) {
        let entry = format!(
            "[{}] {}",
            Local::now().format("%Y-%m-%d %H:%M:%S"),
            message.as_ref()
        );
        println!("{}", entry);

        if let Err(e) = self.append(&entry) {
            println!("Warning: Could not write to log file: {}", e);
        }
    }

    pub fn rule(&self) {
        self.line("=".repeat(60));
    }

    fn append(&self, entry: &str) -> std::io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{}", entry)
    }
}
