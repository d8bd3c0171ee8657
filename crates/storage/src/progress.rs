//! Progress Log Implementation

use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{Local, NaiveDate, NaiveDateTime, SubsecRound};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::StorageError;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Category for the dominant eye state
pub const EMOTION_CATEGORY: &str = "Detected-Emotion";
/// Category for posture grades
pub const POSTURE_CATEGORY: &str = "Posture";

/// One line of the progress log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressEntry {
    pub timestamp: NaiveDateTime,
    pub category: String,
    pub value: String,
}

impl fmt::Display for ProgressEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {} : {}",
            self.timestamp.format(TIMESTAMP_FORMAT),
            self.category,
            self.value
        )
    }
}

impl FromStr for ProgressEntry {
    type Err = StorageError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let malformed = || StorageError::Parse(line.to_string());

        let (stamp, rest) = line.split_once(" - ").ok_or_else(malformed)?;
        let (category, value) = rest.split_once(" : ").ok_or_else(malformed)?;
        let timestamp =
            NaiveDateTime::parse_from_str(stamp, TIMESTAMP_FORMAT).map_err(|_| malformed())?;

        Ok(Self {
            timestamp,
            category: category.trim().to_string(),
            value: value.trim().to_string(),
        })
    }
}

/// Append-only progress log file
#[derive(Debug, Clone)]
pub struct ProgressLog {
    path: PathBuf,
}

impl ProgressLog {
    /// Use the log at `path`, creating parent directories as needed
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append an entry stamped with the local time
    pub fn append(&self, category: &str, value: &str) -> Result<ProgressEntry, StorageError> {
        let entry = ProgressEntry {
            timestamp: Local::now().naive_local().trunc_subsecs(0),
            category: category.to_string(),
            value: value.to_string(),
        };
        self.append_entry(&entry)?;
        Ok(entry)
    }

    pub fn append_entry(&self, entry: &ProgressEntry) -> Result<(), StorageError> {
        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        writeln!(file, "{}", entry)?;
        debug!("Progress: {}", entry);
        Ok(())
    }

    /// Raw lines, or none when the log does not exist yet
    fn lines(&self) -> Result<Vec<String>, StorageError> {
        match File::open(&self.path) {
            Ok(file) => Ok(BufReader::new(file).lines().collect::<Result<_, _>>()?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    /// Keep only lines stamped with `day`; returns the number kept
    pub fn retain_day(&self, day: NaiveDate) -> Result<usize, StorageError> {
        let prefix = day.format("%Y-%m-%d").to_string();
        let lines = self.lines()?;
        let total = lines.len();
        if total == 0 {
            return Ok(0);
        }

        let kept: Vec<String> = lines.into_iter().filter(|l| l.starts_with(&prefix)).collect();
        let mut contents = kept.join("\n");
        if !kept.is_empty() {
            contents.push('\n');
        }
        fs::write(&self.path, contents)?;

        info!(
            "Pruned {} stale lines from {}",
            total - kept.len(),
            self.path.display()
        );
        Ok(kept.len())
    }

    /// Keep only today's lines
    pub fn retain_today(&self) -> Result<usize, StorageError> {
        self.retain_day(Local::now().date_naive())
    }

    /// All well-formed entries; malformed lines are skipped
    pub fn entries(&self) -> Result<Vec<ProgressEntry>, StorageError> {
        Ok(self
            .lines()?
            .iter()
            .filter(|l| !l.trim().is_empty())
            .filter_map(|l| match l.parse::<ProgressEntry>() {
                Ok(entry) => Some(entry),
                Err(e) => {
                    debug!("Skipping line: {}", e);
                    None
                }
            })
            .collect())
    }

    /// Value counts for one category, in order of first appearance
    pub fn tally(&self, category: &str) -> Result<Vec<(String, usize)>, StorageError> {
        let mut counts: Vec<(String, usize)> = Vec::new();
        for entry in self.entries()?.into_iter().filter(|e| e.category == category) {
            match counts.iter_mut().find(|(v, _)| *v == entry.value) {
                Some((_, n)) => *n += 1,
                None => counts.push((entry.value, 1)),
            }
        }
        Ok(counts)
    }
}
