//! CSV bulk import for bus stops and routes.
//!
//! The pipeline reads the file, checks the required headers, checks every row
//! locally, and uploads only the rows that passed. Rows rejected locally are
//! added to the backend's skipped count so the summary covers the whole file.

mod rows;
mod summary;

pub use rows::*;
pub use summary::*;

use csv::{ReaderBuilder, StringRecord, Trim, WriterBuilder};
use serde::de::DeserializeOwned;
use std::{io::Read, time::Instant};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{
    backend,
    model::{RouteGroup, RouteWorkspaceData},
    validate::validate_route_structure,
};

#[derive(Error, Debug)]
pub enum Error {
    #[error("Csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Csv file is missing header {0}")]
    MissingHeader(String),
    #[error("Csv file has no rows")]
    Empty,
    #[error("None of the {0} row(s) can be imported")]
    NothingToImport(usize),
    #[error("Import request failed: {0}")]
    Backend(#[from] backend::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImportKind {
    Stops,
    Routes,
}

impl ImportKind {
    /// Path segment of the service resource.
    pub const fn resource(&self) -> &'static str {
        match self {
            ImportKind::Stops => "stops",
            ImportKind::Routes => "routes",
        }
    }

    pub const fn headers(&self) -> &'static [&'static str] {
        match self {
            ImportKind::Stops => STOP_HEADERS,
            ImportKind::Routes => ROUTE_HEADERS,
        }
    }

    pub const fn required_headers(&self) -> &'static [&'static str] {
        match self {
            ImportKind::Stops => REQUIRED_STOP_HEADERS,
            ImportKind::Routes => REQUIRED_ROUTE_HEADERS,
        }
    }

    /// Header line plus one example row, used when the service cannot provide one.
    pub fn template(&self) -> String {
        let example = match self {
            ImportKind::Stops => STOP_EXAMPLE,
            ImportKind::Routes => ROUTE_EXAMPLE,
        };
        format!("{}\n{}\n", self.headers().join(","), example)
    }
}

/// The service side of an import.
pub trait ImportBackend {
    fn upload(
        &self,
        kind: ImportKind,
        csv: String,
    ) -> impl Future<Output = Result<ImportSummary, backend::Error>> + Send;

    fn template(
        &self,
        kind: ImportKind,
    ) -> impl Future<Output = Result<String, backend::Error>> + Send;
}

/// A parsed CSV file: headers plus rows, blank cells as `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CsvTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl CsvTable {
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, self::Error> {
        let mut reader = ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .from_reader(reader);
        let headers = reader
            .headers()?
            .iter()
            .map(|header| header.to_lowercase())
            .collect();
        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            if record.iter().all(str::is_empty) {
                continue;
            }
            rows.push(
                record
                    .iter()
                    .map(|cell| (!cell.is_empty()).then(|| cell.to_string()))
                    .collect(),
            );
        }
        Ok(Self { headers, rows })
    }

    pub fn check_headers(&self, kind: ImportKind) -> Result<(), self::Error> {
        match kind
            .required_headers()
            .iter()
            .find(|required| !self.headers.iter().any(|header| header == *required))
        {
            Some(missing) => Err(self::Error::MissingHeader(missing.to_string())),
            None => Ok(()),
        }
    }

    fn header_record(&self) -> StringRecord {
        StringRecord::from(self.headers.clone())
    }

    fn record(row: &[Option<String>]) -> StringRecord {
        row.iter()
            .map(|cell| cell.as_deref().unwrap_or_default())
            .collect()
    }

    /// Deserializes every row into `T`, keeping row numbers (1 based, header excluded).
    pub fn deserialize<T: DeserializeOwned>(&self) -> Vec<(usize, Result<T, csv::Error>)> {
        let headers = self.header_record();
        self.rows
            .iter()
            .enumerate()
            .map(|(i, row)| (i + 1, Self::record(row).deserialize(Some(&headers))))
            .collect()
    }

    /// Writes the header and the selected rows back out as CSV text.
    pub fn to_csv(&self, rows: &[usize]) -> Result<String, self::Error> {
        let mut writer = WriterBuilder::new().from_writer(Vec::new());
        writer.write_record(&self.header_record())?;
        for row in rows.iter().filter_map(|i| self.rows.get(*i)) {
            writer.write_record(&Self::record(row))?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|err| csv::Error::from(err.into_error()))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

/// Local result of checking a file before it is uploaded.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportPreview {
    pub kind: ImportKind,
    pub table: CsvTable,
    /// Indexes into `table.rows` that passed the local checks.
    pub accepted: Vec<usize>,
    pub rejected: Vec<RowIssue>,
    /// Accepted route rows collected into their groups; empty for stops.
    pub groups: Vec<RouteGroup>,
    /// Structure findings on `groups`. Advisory only, the service decides
    /// on every uploaded row.
    pub warnings: Vec<String>,
}

impl ImportPreview {
    pub fn total(&self) -> usize {
        self.table.rows.len()
    }
}

pub fn preview<R: Read>(kind: ImportKind, reader: R) -> Result<ImportPreview, self::Error> {
    let table = CsvTable::from_reader(reader)?;
    table.check_headers(kind)?;
    if table.rows.is_empty() {
        return Err(self::Error::Empty);
    }

    let mut groups = Vec::new();
    let checked: Vec<(usize, Result<(), String>)> = match kind {
        ImportKind::Stops => table
            .deserialize::<StopRow>()
            .into_iter()
            .map(|(row, parsed)| (row, check_row(parsed, StopRow::check)))
            .collect(),
        ImportKind::Routes => {
            let mut passed = Vec::new();
            let checked = table
                .deserialize::<RouteRow>()
                .into_iter()
                .map(|(row, parsed)| {
                    let result = parsed.map_err(|err| err.to_string()).and_then(|route| {
                        route.check()?;
                        passed.push(route);
                        Ok(())
                    });
                    (row, result)
                })
                .collect();
            groups = group_routes(&passed);
            checked
        }
    };
    let warnings = groups.iter().flat_map(group_warnings).collect();

    let mut accepted = Vec::new();
    let mut rejected = Vec::new();
    for (row, result) in checked {
        match result {
            Ok(()) => accepted.push(row - 1),
            Err(message) => rejected.push(RowIssue { row, message }),
        }
    }
    Ok(ImportPreview {
        kind,
        table,
        accepted,
        rejected,
        groups,
        warnings,
    })
}

fn group_warnings(group: &RouteGroup) -> Vec<String> {
    let data = RouteWorkspaceData {
        route_group: group.clone(),
    };
    validate_route_structure(&data)
        .issues
        .iter()
        .map(|issue| format!("route group `{}`: {issue}", group.name.english))
        .collect()
}

fn check_row<T>(
    parsed: Result<T, csv::Error>,
    check: impl Fn(&T) -> Result<(), String>,
) -> Result<(), String> {
    let row = parsed.map_err(|err| err.to_string())?;
    check(&row)
}

/// Runs the whole pipeline against `backend`.
pub async fn import<B, R>(backend: &B, kind: ImportKind, reader: R) -> Result<ImportOutcome, self::Error>
where
    B: ImportBackend,
    R: Read,
{
    let now = Instant::now();
    let preview = preview(kind, reader)?;
    if preview.accepted.is_empty() {
        return Err(self::Error::NothingToImport(preview.total()));
    }
    preview.rejected.iter().for_each(|issue| {
        warn!("Skipping {} row {}: {}", kind.resource(), issue.row, issue.message)
    });
    preview
        .warnings
        .iter()
        .for_each(|warning| warn!("Uploading anyway, {warning}"));
    if kind == ImportKind::Routes {
        debug!(
            "Uploading {} route(s) in {} group(s)",
            preview.accepted.len(),
            preview.groups.len()
        );
    }

    let csv = preview.table.to_csv(&preview.accepted)?;
    let mut summary = backend.upload(kind, csv).await?;
    summary.skipped_records += preview.rejected.len() as u32;
    summary.total_records += preview.rejected.len() as u32;
    summary.errors.extend(
        preview
            .rejected
            .iter()
            .map(|issue| format!("row {}: {}", issue.row, issue.message)),
    );
    debug!("Importing {} took {:?}", kind.resource(), now.elapsed());
    info!(
        "Imported {} of {} {}",
        summary.successful_imports,
        summary.total_records,
        kind.resource()
    );
    Ok(summary.outcome())
}

/// Template from the service, falling back to the built-in one.
pub async fn template<B: ImportBackend>(backend: &B, kind: ImportKind) -> String {
    match backend.template(kind).await {
        Ok(template) => template,
        Err(err) => {
            warn!("Using built-in {} template: {err}", kind.resource());
            kind.template()
        }
    }
}
