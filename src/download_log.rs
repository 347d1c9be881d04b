use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{Duration, Local, NaiveDateTime};
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

pub const LOG_HEADER: &str = "Timestamp,User,Subject,ExamType,Year";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Error)]
pub enum DownloadLogError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Malformed log at line {line}: {reason}")]
    Malformed { line: usize, reason: String },
}

/// One successful download, as stored in the log file.
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadRecord {
    pub timestamp: NaiveDateTime,
    pub user: String,
    pub subject: String,
    pub exam_type: String,
    /// Empty for year-independent resources (units, lab material).
    pub year: String,
}

impl DownloadRecord {
    fn to_line(&self) -> String {
        format!(
            "{},{},{},{},{}",
            self.timestamp.format(TIMESTAMP_FORMAT),
            self.user,
            self.subject,
            self.exam_type,
            self.year
        )
    }

    fn parse(line: &str, number: usize) -> Result<Self, DownloadLogError> {
        let fields: Vec<&str> = line.split(',').collect();
        if fields.len() != 5 {
            return Err(DownloadLogError::Malformed {
                line: number,
                reason: format!("expected 5 fields, got {}", fields.len()),
            });
        }

        let timestamp = NaiveDateTime::parse_from_str(fields[0], TIMESTAMP_FORMAT).map_err(
            |e| DownloadLogError::Malformed {
                line: number,
                reason: format!("bad timestamp '{}': {e}", fields[0]),
            },
        )?;

        Ok(DownloadRecord {
            timestamp,
            user: fields[1].to_string(),
            subject: fields[2].to_string(),
            exam_type: fields[3].to_string(),
            year: fields[4].to_string(),
        })
    }
}

/// Aggregates computed by the weekly report job.
#[derive(Debug, Default, PartialEq)]
pub struct UsageSummary {
    pub total: u64,
    pub top_subjects: Vec<(String, u64)>,
    pub top_users: Vec<(String, u64)>,
}

/// Append-only CSV log of successful downloads.
///
/// Clones share a single mutex, so request appends, the prune rewrite, and
/// the report read never interleave on the file.
#[derive(Clone)]
pub struct DownloadLog {
    path: PathBuf,
    retention_days: i64,
    lock: Arc<Mutex<()>>,
}

impl DownloadLog {
    pub fn new<P: AsRef<Path>>(path: P, retention_days: i64) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            retention_days,
            lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record, creating the file with its header row first if it
    /// does not exist yet. The whole row is written in a single call while
    /// holding the lock, so concurrent requests cannot interleave fields.
    pub async fn record(
        &self,
        user: &str,
        subject: &str,
        exam_type: &str,
        year: &str,
    ) -> Result<(), DownloadLogError> {
        let record = DownloadRecord {
            timestamp: Local::now().naive_local(),
            user: sanitize(user),
            subject: sanitize(subject),
            exam_type: sanitize(exam_type),
            year: sanitize(year),
        };

        let _guard = self.lock.lock().await;

        let mut out = String::new();
        if !self.path.exists() {
            out.push_str(LOG_HEADER);
            out.push('\n');
        }
        out.push_str(&record.to_line());
        out.push('\n');

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(out.as_bytes()).await?;
        file.flush().await?;

        Ok(())
    }

    /// Drop records older than the retention horizon, preserving the order
    /// of the rest. Rewrites via a temp file and atomic rename. An absent
    /// file is a no-op; a malformed file is left untouched.
    ///
    /// Returns the number of records dropped.
    pub async fn prune(&self) -> Result<usize, DownloadLogError> {
        let _guard = self.lock.lock().await;

        let records = match self.read_records().await? {
            Some(records) => records,
            None => return Ok(0),
        };

        let cutoff = Local::now().naive_local() - Duration::days(self.retention_days);
        let total = records.len();
        let kept: Vec<DownloadRecord> =
            records.into_iter().filter(|r| r.timestamp >= cutoff).collect();
        let dropped = total - kept.len();

        let mut out = String::with_capacity(LOG_HEADER.len() + 1 + kept.len() * 48);
        out.push_str(LOG_HEADER);
        out.push('\n');
        for record in &kept {
            out.push_str(&record.to_line());
            out.push('\n');
        }

        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, out.as_bytes()).await?;
        tokio::fs::rename(&tmp, &self.path).await?;

        Ok(dropped)
    }

    /// Total download count and top-3 subjects/users by frequency.
    /// Ties break alphabetically so the output is deterministic.
    pub async fn usage_summary(&self) -> Result<UsageSummary, DownloadLogError> {
        let _guard = self.lock.lock().await;

        let records = match self.read_records().await? {
            Some(records) => records,
            None => return Ok(UsageSummary::default()),
        };

        let mut by_subject: HashMap<String, u64> = HashMap::new();
        let mut by_user: HashMap<String, u64> = HashMap::new();
        for record in &records {
            *by_subject.entry(record.subject.clone()).or_default() += 1;
            *by_user.entry(record.user.clone()).or_default() += 1;
        }

        Ok(UsageSummary {
            total: records.len() as u64,
            top_subjects: top_entries(by_subject),
            top_users: top_entries(by_user),
        })
    }

    /// Parse the whole log. `None` means the file does not exist.
    /// Caller must hold the lock.
    async fn read_records(&self) -> Result<Option<Vec<DownloadRecord>>, DownloadLogError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let mut lines = content.lines().enumerate();
        match lines.next() {
            Some((_, header)) if header == LOG_HEADER => {}
            Some((_, other)) => {
                return Err(DownloadLogError::Malformed {
                    line: 1,
                    reason: format!("unexpected header '{other}'"),
                })
            }
            None => return Ok(Some(Vec::new())),
        }

        let mut records = Vec::new();
        for (index, line) in lines {
            if line.is_empty() {
                continue;
            }
            records.push(DownloadRecord::parse(line, index + 1)?);
        }
        Ok(Some(records))
    }
}

/// Commas and newlines in a field would corrupt the row format.
fn sanitize(field: &str) -> String {
    field
        .chars()
        .map(|c| if c == ',' || c == '\n' || c == '\r' { ' ' } else { c })
        .collect()
}

fn top_entries(counts: HashMap<String, u64>) -> Vec<(String, u64)> {
    let mut entries: Vec<(String, u64)> = counts.into_iter().collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    entries.truncate(3);
    entries
}
