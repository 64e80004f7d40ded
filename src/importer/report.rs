use anyhow::Result;
use serde::Serialize;

use super::rows::RowError;
use crate::scripts::LogEntry;

/// What happened to one CSV row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RowOutcome {
    Created {
        vid: i32,
        name: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        group: Option<String>,
    },
    SkippedDuplicate {
        vid: i32,
        name: String,
    },
    Failed {
        error: RowError,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowReport {
    /// 1-based index of the data row (header excluded)
    pub row: usize,
    #[serde(flatten)]
    pub outcome: RowOutcome,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportCounts {
    pub created: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Ordered per-row outcomes of one import run plus aggregate counts
#[derive(Debug, Clone, Serialize)]
pub struct ImportReport {
    pub site: String,
    pub rows: Vec<RowReport>,
    pub counts: ImportCounts,
}

impl ImportReport {
    pub fn new(site: impl Into<String>) -> Self {
        Self {
            site: site.into(),
            rows: Vec::new(),
            counts: ImportCounts::default(),
        }
    }

    pub fn push(&mut self, row: usize, outcome: RowOutcome) {
        match &outcome {
            RowOutcome::Created { .. } => self.counts.created += 1,
            RowOutcome::SkippedDuplicate { .. } => self.counts.skipped += 1,
            RowOutcome::Failed { .. } => self.counts.failed += 1,
        }
        self.rows.push(RowReport { row, outcome });
    }

    /// True when no row failed; duplicate skips are not failures
    pub fn is_success(&self) -> bool {
        self.counts.failed == 0
    }

    /// CSV table of the VLANs this run created: `VLAN ID,Name,Group`
    pub fn summary_csv(&self) -> Result<String> {
        let mut writer = csv::WriterBuilder::new()
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(Vec::new());

        writer.write_record(["VLAN ID", "Name", "Group"])?;
        for report in &self.rows {
            if let RowOutcome::Created { vid, name, group } = &report.outcome {
                let vid = vid.to_string();
                writer.write_record([vid.as_str(), name.as_str(), group.as_deref().unwrap_or("")])?;
            }
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| anyhow::anyhow!("Failed to flush CSV summary: {}", e))?;
        let text = String::from_utf8(bytes)?;
        Ok(text.trim_end_matches('\n').to_string())
    }

    /// One log line per row followed by a summary line
    pub fn log_entries(&self) -> Vec<LogEntry> {
        let mut entries: Vec<LogEntry> = self
            .rows
            .iter()
            .map(|report| match &report.outcome {
                RowOutcome::Created { vid, name, .. } => LogEntry::success(format!(
                    "Created VLAN {} with ID {} for site {}",
                    name, vid, self.site
                )),
                RowOutcome::SkippedDuplicate { vid, name } => LogEntry::warning(format!(
                    "VLAN {} with ID {} already exists for site {}",
                    name, vid, self.site
                )),
                RowOutcome::Failed { error } => {
                    LogEntry::failure(format!("Row {}: {}", report.row, error))
                }
            })
            .collect();

        let summary = format!(
            "Imported VLANs for site {}: {} created, {} duplicate(s) skipped, {} row(s) failed",
            self.site, self.counts.created, self.counts.skipped, self.counts.failed
        );
        entries.push(if self.is_success() {
            LogEntry::success(summary)
        } else {
            LogEntry::warning(summary)
        });
        entries
    }
}
