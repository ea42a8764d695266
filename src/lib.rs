//! Spreadsheet CSV exports to clean data files and typed C# containers.
//!
//! A sheet document is laid out as:
//! - row 1: sheet name in the first cell (becomes the class name)
//! - row 2: field names, row 3: field types
//! - row 4+: data, first column repeats the sheet name
//!
//! Two pipelines share the same front half:
//! - [`import_sheet`]: extract → validate → slice into a header-less CSV
//! - [`generate_sources`]: extract → validate → emit record + collection sources
//!
//! Everything up to the produced text is synchronous and pure. Loading,
//! fetching and writing ([`load_document`], [`SheetFetcher`], [`write_csv`],
//! [`write_sources`]) are async and live at the edges.
#![cfg_attr(docsrs, feature(doc_cfg))]
//
mod codec;
pub mod codegen;
mod fetch;
mod io;
mod output;
pub mod schema;
mod slice;
pub mod tokenize;
pub mod validate;

pub use crate::codegen::{generate_collection_source, generate_record_source};
pub use crate::fetch::{export_url, FetchError, SheetFetcher, DEFAULT_TIMEOUT};
pub use crate::io::{build_document_reader, load_document, read_document, SourceMeta};
pub use crate::output::{
    write_csv, write_sources, AlwaysOverwrite, ArtifactWriter, ConfirmOverwrite, FsWriter,
    NeverOverwrite, OutputLayout, PairOutcome, WriteOutcome,
};
pub use crate::schema::{extract_schema, Schema, SupportedType};
pub use crate::slice::slice_data_rows;
pub use crate::tokenize::tokenize;
pub use crate::validate::{
    validate_names, validate_types, NameIssue, NameRule, TypeIssue, ValidatedSchema,
};

use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Error type for every stage of the import/generate pipelines.
///
/// Downloads report through [`FetchError`] instead.
#[derive(Debug, Error)]
pub enum SheetError {
    #[error("Sheet needs a name row, field row, type row and at least one data row; found {found} non-empty rows")]
    InsufficientRows { found: usize },
    #[error("Sheet name (first cell) is empty after removing characters outside [A-Za-z0-9_]")]
    EmptySheetName,
    #[error("Found {names} field names but {types} field types")]
    FieldCountMismatch { names: usize, types: usize },
    #[error("Invalid field names:\n{}", Lines(.0))]
    NameValidationFailed(Vec<NameIssue>),
    #[error("Invalid field types:\n{}", Lines(.0))]
    TypeValidationFailed(Vec<TypeIssue>),
    /// Both validators failed; names first, then types.
    #[error("{}", Lines(.0))]
    InvalidSchema(Vec<SheetError>),
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SheetError {
    pub(crate) fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        SheetError::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}

/// Renders one item per line.
struct Lines<'a, T>(&'a [T]);

impl<T: fmt::Display> fmt::Display for Lines<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, item) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{item}")?;
        }
        Ok(())
    }
}

pub type SheetResult<T> = std::result::Result<T, SheetError>;

/// Clean data CSV for one sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetImport {
    pub class_name: String,
    pub csv: String,
}

/// Record and collection sources for one sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedSources {
    pub class_name: String,
    pub record: String,
    pub collection: String,
}

impl GeneratedSources {
    /// CRC32 over both sources; equal inputs give equal fingerprints.
    pub fn fingerprint(&self) -> u32 {
        let mut crc = crc32fast::Hasher::new();
        crc.update(self.record.as_bytes());
        crc.update(&[0x1f]);
        crc.update(self.collection.as_bytes());
        crc.finalize()
    }
}

/// Validate a sheet document and strip it down to its data rows.
pub fn import_sheet(doc: &str) -> SheetResult<SheetImport> {
    let schema = extract_schema(doc)?.validate()?;
    let csv = slice_data_rows(doc);
    tracing::debug!(class = %schema.class_name, rows = csv.lines().count(), "sliced data rows");
    Ok(SheetImport {
        class_name: schema.class_name,
        csv,
    })
}

/// Validate a sheet document and generate its record and collection sources.
pub fn generate_sources(doc: &str) -> SheetResult<GeneratedSources> {
    let schema = extract_schema(doc)?.validate()?;
    let (record, collection) = codegen::generate_for_schema(&schema);
    let sources = GeneratedSources {
        class_name: schema.class_name,
        record,
        collection,
    };
    tracing::debug!(
        class = %sources.class_name,
        fields = schema.fields.len(),
        crc = sources.fingerprint(),
        "generated sources"
    );
    Ok(sources)
}
