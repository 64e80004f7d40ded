//! CSV VLAN importer.
//!
//! Fetches a CSV document, turns each row into a VLAN for the target site and
//! reconciles it against what the inventory already holds. Fetch, decode and
//! header problems abort the run; anything wrong with a single row is recorded
//! in the report and the next row is processed.

pub mod report;
pub mod rows;
pub mod source;

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::inventory::{CreateOutcome, VlanStore};
use crate::models::NewVlan;

pub use report::{ImportReport, RowOutcome};
pub use rows::{CsvRows, RowError, VlanFields};
pub use source::{Fetcher, Source};

/// Which CSV headers hold the VLAN id and name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMap {
    #[serde(default = "default_id_column")]
    pub id: String,
    #[serde(default = "default_name_column")]
    pub name: String,
}

fn default_id_column() -> String {
    "vlan_id".to_string()
}

fn default_name_column() -> String {
    "vlan_name".to_string()
}

impl Default for ColumnMap {
    fn default() -> Self {
        Self {
            id: default_id_column(),
            name: default_name_column(),
        }
    }
}

#[cfg(test)]
impl ColumnMap {
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
        }
    }
}

/// The site VLANs are imported into. Not validated here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteRef {
    pub id: i64,
    pub name: String,
}

/// Optional VLAN group every created VLAN joins
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupRef {
    pub id: i64,
    pub name: String,
}

/// Failures that abort an import before any row is processed
#[derive(Debug)]
pub enum ImportError {
    Fetch { location: String, message: String },
    Decode { location: String, message: String },
    Schema { missing: Vec<String>, detected: Vec<String> },
}

impl fmt::Display for ImportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportError::Fetch { location, message } => {
                write!(f, "Failed to fetch the CSV file {}: {}", location, message)
            }
            ImportError::Decode { location, message } => {
                write!(f, "Failed to decode the CSV file {} as UTF-8 text: {}", location, message)
            }
            ImportError::Schema { missing, detected } => write!(
                f,
                "CSV is missing required column(s) {}; detected headers: [{}]",
                missing.join(", "),
                detected.join(", ")
            ),
        }
    }
}

impl std::error::Error for ImportError {}

impl ImportError {
    /// Attach the source location to a decode error raised while parsing
    fn located_at(self, source: &Source) -> Self {
        match self {
            ImportError::Decode { message, .. } => ImportError::Decode {
                location: source.to_string(),
                message,
            },
            other => other,
        }
    }
}

/// Fetch `source` and import its rows as VLANs of `site`
pub async fn import_vlans<S: VlanStore + ?Sized>(
    store: &S,
    fetcher: &Fetcher,
    source: &Source,
    site: &SiteRef,
    columns: &ColumnMap,
    group: Option<&GroupRef>,
) -> Result<ImportReport, ImportError> {
    tracing::info!("Importing VLANs for site {} from {}", site.name, source);
    let bytes = fetcher.fetch(source).await?;
    import_csv(store, &bytes, site, columns, group)
        .await
        .map_err(|e| e.located_at(source))
}

/// Import VLANs from an already-fetched CSV document. The header row must be
/// UTF-8; a later record that is not becomes a `malformed` row.
pub async fn import_csv<S: VlanStore + ?Sized>(
    store: &S,
    input: &[u8],
    site: &SiteRef,
    columns: &ColumnMap,
    group: Option<&GroupRef>,
) -> Result<ImportReport, ImportError> {
    let rows = CsvRows::open(input, columns)?;
    tracing::debug!("CSV headers: {:?}", rows.headers());

    let mut report = ImportReport::new(site.name.clone());
    for (index, row) in rows {
        let outcome = match row.and_then(|r| VlanFields::from_row(&r, columns)) {
            Ok(fields) => reconcile(store, site, group, fields).await,
            Err(error) => RowOutcome::Failed { error },
        };

        match &outcome {
            RowOutcome::Created { vid, name, .. } => {
                tracing::info!("Row {}: created VLAN {} ({}) for site {}", index, vid, name, site.name)
            }
            RowOutcome::SkippedDuplicate { vid, .. } => {
                tracing::info!("Row {}: VLAN {} already exists for site {}", index, vid, site.name)
            }
            RowOutcome::Failed { error } => tracing::warn!("Row {}: {}", index, error),
        }
        report.push(index, outcome);
    }

    tracing::info!(
        "VLAN import for site {} finished: {} created, {} skipped, {} failed",
        site.name, report.counts.created, report.counts.skipped, report.counts.failed
    );
    Ok(report)
}

/// Existence check, then create. A create that loses a race to another
/// writer comes back as `AlreadyExists` and is reported as a skip too.
async fn reconcile<S: VlanStore + ?Sized>(
    store: &S,
    site: &SiteRef,
    group: Option<&GroupRef>,
    fields: VlanFields,
) -> RowOutcome {
    let backend_error = |e: anyhow::Error| RowOutcome::Failed {
        error: RowError::Backend { message: format!("{:#}", e) },
    };

    match store.vlan_exists(site.id, fields.vid).await {
        Ok(true) => {
            return RowOutcome::SkippedDuplicate { vid: fields.vid, name: fields.name };
        }
        Ok(false) => {}
        Err(e) => return backend_error(e),
    }

    let new_vlan = NewVlan {
        vid: fields.vid,
        name: fields.name,
        site_id: site.id,
        group_id: group.map(|g| g.id),
    };

    match store.create_vlan(&new_vlan).await {
        Ok(CreateOutcome::Created(vlan)) => RowOutcome::Created {
            vid: vlan.vid,
            name: vlan.name,
            group: group.map(|g| g.name.clone()),
        },
        Ok(CreateOutcome::AlreadyExists) => RowOutcome::SkippedDuplicate {
            vid: new_vlan.vid,
            name: new_vlan.name,
        },
        Err(e) => backend_error(e),
    }
}
