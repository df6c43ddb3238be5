//! Access log writer
//!
//! Access lines go to stdout or to an append-only file. Diagnostics never
//! pass through here; they use `tracing`.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Mutex, OnceLock, PoisonError};

static ACCESS_WRITER: OnceLock<AccessWriter> = OnceLock::new();

enum Target {
    Stdout,
    File(Mutex<File>),
}

pub struct AccessWriter {
    target: Target,
}

impl AccessWriter {
    fn open(path: Option<&str>) -> io::Result<Self> {
        let target = match path {
            Some(p) => Target::File(Mutex::new(open_log_file(p)?)),
            None => Target::Stdout,
        };
        Ok(Self { target })
    }

    pub fn write_line(&self, line: &str) {
        match &self.target {
            Target::Stdout => println!("{line}"),
            Target::File(file) => {
                let mut f = file.lock().unwrap_or_else(PoisonError::into_inner);
                if let Err(e) = writeln!(f, "{line}") {
                    tracing::warn!("access log write failed: {e}");
                }
            }
        }
    }
}

/// Open or create a log file for appending
fn open_log_file(path: &str) -> io::Result<File> {
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    OpenOptions::new().create(true).append(true).open(path)
}

/// Install the process-wide access writer
///
/// A second call keeps the first writer and reports `AlreadyExists`.
pub fn init(access_log_file: Option<&str>) -> io::Result<()> {
    let writer = AccessWriter::open(access_log_file)?;
    ACCESS_WRITER.set(writer).map_err(|_| {
        io::Error::new(io::ErrorKind::AlreadyExists, "access log already initialized")
    })
}

/// Write one access line, falling back to stdout before `init`
pub fn write_access(line: &str) {
    match ACCESS_WRITER.get() {
        Some(writer) => writer.write_line(line),
        None => println!("{line}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_target_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs/access.log");
        let path_str = path.to_str().unwrap();

        let writer = AccessWriter::open(Some(path_str)).unwrap();
        writer.write_line("first");
        writer.write_line("second");
        drop(writer);

        let writer = AccessWriter::open(Some(path_str)).unwrap();
        writer.write_line("third");

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "first\nsecond\nthird\n");
    }
}
