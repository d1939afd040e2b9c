//! Rotating file log sink.
//!
//! Writes every accepted entry to `app.log` and entries at error level to
//! `error.log` as well. Each file rolls over to `name.1 .. name.N` once it
//! would exceed the size limit.

use async_trait::async_trait;
use bridge_traits::{
    error::Result,
    logging::{LogEntry, LogLevel, LoggerSink},
};
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs::{self, File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

pub const DEFAULT_MAX_BYTES: u64 = 10 * 1024 * 1024;
pub const DEFAULT_BACKUPS: usize = 5;

struct RotatingFile {
    path: PathBuf,
    max_bytes: u64,
    backups: usize,
    file: Option<File>,
    written: u64,
}

impl RotatingFile {
    fn new(path: PathBuf, max_bytes: u64, backups: usize) -> Self {
        Self {
            path,
            max_bytes,
            backups,
            file: None,
            written: 0,
        }
    }

    fn backup_path(&self, index: usize) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(format!(".{}", index));
        PathBuf::from(name)
    }

    async fn open(&mut self) -> io::Result<()> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        self.written = file.metadata().await?.len();
        self.file = Some(file);
        Ok(())
    }

    async fn rotate(&mut self) -> io::Result<()> {
        self.file = None;

        if self.backups == 0 {
            fs::remove_file(&self.path).await?;
        } else {
            for index in (1..self.backups).rev() {
                let from = self.backup_path(index);
                if fs::try_exists(&from).await? {
                    fs::rename(&from, self.backup_path(index + 1)).await?;
                }
            }
            fs::rename(&self.path, self.backup_path(1)).await?;
        }

        self.open().await
    }

    async fn write_line(&mut self, line: &str) -> io::Result<()> {
        let len = line.len() as u64 + 1;

        if self.file.is_none() {
            self.open().await?;
        }
        if self.written > 0 && self.written + len > self.max_bytes {
            self.rotate().await?;
        }

        if let Some(file) = self.file.as_mut() {
            file.write_all(line.as_bytes()).await?;
            file.write_all(b"\n").await?;
            file.flush().await?;
            self.written += len;
        }
        Ok(())
    }
}

/// [`LoggerSink`] backed by two size-rotated files in one directory.
pub struct RotatingFileSink {
    app: Mutex<RotatingFile>,
    errors: Mutex<RotatingFile>,
    min_level: LogLevel,
}

impl RotatingFileSink {
    /// Create the sink, creating `dir` if needed.
    pub async fn new(dir: impl AsRef<Path>, min_level: LogLevel) -> Result<Self> {
        Self::with_limits(dir, min_level, DEFAULT_MAX_BYTES, DEFAULT_BACKUPS).await
    }

    pub async fn with_limits(
        dir: impl AsRef<Path>,
        min_level: LogLevel,
        max_bytes: u64,
        backups: usize,
    ) -> Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir).await?;

        Ok(Self {
            app: Mutex::new(RotatingFile::new(dir.join("app.log"), max_bytes, backups)),
            errors: Mutex::new(RotatingFile::new(
                dir.join("error.log"),
                max_bytes,
                backups,
            )),
            min_level,
        })
    }
}

#[async_trait]
impl LoggerSink for RotatingFileSink {
    async fn log(&self, entry: LogEntry) -> Result<()> {
        if entry.level < self.min_level {
            return Ok(());
        }

        let line = entry.render_line();
        self.app.lock().await.write_line(&line).await?;
        if entry.level >= LogLevel::Error {
            self.errors.lock().await.write_line(&line).await?;
        }
        Ok(())
    }

    async fn flush(&self) -> Result<()> {
        for file in [&self.app, &self.errors] {
            if let Some(handle) = file.lock().await.file.as_mut() {
                handle.flush().await?;
            }
        }
        Ok(())
    }

    fn min_level(&self) -> LogLevel {
        self.min_level
    }
}
