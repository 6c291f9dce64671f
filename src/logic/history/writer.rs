use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;
use parking_lot::Mutex;
use serde::Serialize;

use crate::constants::MAX_HISTORY_FILE_SIZE;

/// Append-only JSONL log with size-based rotation
///
/// Files are named `<prefix>-YYYY-MM-DD-HHMMSS.jsonl`; a numeric suffix is
/// added when a rotation lands in the same second.
#[derive(Debug)]
pub struct JsonlWriter {
    prefix: &'static str,
    base_dir: PathBuf,
    max_size: u64,
    file: Mutex<Option<File>>,
}

impl JsonlWriter {
    pub fn new(base_dir: &Path, prefix: &'static str) -> Self {
        if let Err(e) = fs::create_dir_all(base_dir) {
            tracing::error!(dir = %base_dir.display(), error = %e, "Failed to create history directory");
        }

        Self {
            prefix,
            base_dir: base_dir.to_path_buf(),
            max_size: MAX_HISTORY_FILE_SIZE,
            file: Mutex::new(None),
        }
    }

    /// Override the rotation size
    pub fn with_max_size(mut self, max_size: u64) -> Self {
        self.max_size = max_size.max(1);
        self
    }

    /// Append one JSON line, rotating first if the current file is full
    pub fn append<T: Serialize>(&self, entry: &T) -> io::Result<()> {
        let line = serde_json::to_string(entry)?;
        let mut guard = self.file.lock();

        let file = match guard.take() {
            Some(f) if f.metadata()?.len() < self.max_size => f,
            Some(_) => self.create_new_file()?,
            None => self.open_latest_or_create()?,
        };
        let file = guard.insert(file);

        writeln!(file, "{}", line)?;
        Ok(())
    }

    /// `(file count, total MB, latest file name)` for this prefix
    pub fn stats(&self) -> io::Result<(usize, f32, String)> {
        let files = self.list_files()?;
        let size: u64 = files
            .iter()
            .filter_map(|p| fs::metadata(p).ok())
            .map(|m| m.len())
            .sum();
        let latest = self
            .latest_file()?
            .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
            .unwrap_or_else(|| "None".to_string());

        Ok((files.len(), size as f32 / 1024.0 / 1024.0, latest))
    }

    fn open_latest_or_create(&self) -> io::Result<File> {
        if let Some(path) = self.latest_file()? {
            let f = OpenOptions::new().create(true).append(true).open(&path)?;
            if f.metadata()?.len() < self.max_size {
                return Ok(f);
            }
        }
        self.create_new_file()
    }

    fn create_new_file(&self) -> io::Result<File> {
        let stamp = Utc::now().format("%Y-%m-%d-%H%M%S");
        let mut path = self.base_dir.join(format!("{}-{}.jsonl", self.prefix, stamp));
        let mut seq = 1;
        while path.exists() {
            path = self.base_dir.join(format!("{}-{}-{}.jsonl", self.prefix, stamp, seq));
            seq += 1;
        }

        tracing::debug!(path = %path.display(), "Opening new history file");
        OpenOptions::new().create(true).append(true).open(path)
    }

    fn list_files(&self) -> io::Result<Vec<PathBuf>> {
        let marker = format!("{}-", self.prefix);
        Ok(fs::read_dir(&self.base_dir)?
            .filter_map(|res| res.ok())
            .map(|e| e.path())
            .filter(|p| p.extension().map_or(false, |ext| ext == "jsonl"))
            .filter(|p| {
                p.file_name()
                    .and_then(|n| n.to_str())
                    .map_or(false, |n| n.starts_with(&marker))
            })
            .collect())
    }

    /// Most recently modified file; name breaks ties
    fn latest_file(&self) -> io::Result<Option<PathBuf>> {
        let newest = self
            .list_files()?
            .into_iter()
            .filter_map(|p| {
                let modified = fs::metadata(&p).and_then(|m| m.modified()).ok()?;
                Some((modified, p))
            })
            .max();
        Ok(newest.map(|(_, p)| p))
    }
}
