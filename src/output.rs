//! Persisting generated artifacts: overwrite confirmation, skip-if-identical,
//! and rollback so a generation never leaves half a record/collection pair.

use crate::{GeneratedSources, SheetError, SheetImport, SheetResult};
use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};

/// Asked once per artifact that already exists on disk.
pub trait ConfirmOverwrite {
    fn confirm_overwrite(&self, resource_label: &str) -> bool;
}

pub struct AlwaysOverwrite;

impl ConfirmOverwrite for AlwaysOverwrite {
    fn confirm_overwrite(&self, _resource_label: &str) -> bool {
        true
    }
}

pub struct NeverOverwrite;

impl ConfirmOverwrite for NeverOverwrite {
    fn confirm_overwrite(&self, _resource_label: &str) -> bool {
        false
    }
}

/// Storage the artifacts land in.
pub trait ArtifactWriter {
    /// Current contents, `None` if nothing exists at `path`.
    fn read(&self, path: &Path) -> impl Future<Output = io::Result<Option<Vec<u8>>>> + Send;
    fn write(&self, path: &Path, content: &[u8]) -> impl Future<Output = io::Result<()>> + Send;
    fn remove(&self, path: &Path) -> impl Future<Output = io::Result<()>> + Send;
}

/// Writes through `tokio::fs`, creating parent directories on demand.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsWriter;

impl ArtifactWriter for FsWriter {
    async fn read(&self, path: &Path) -> io::Result<Option<Vec<u8>>> {
        match tokio::fs::read(path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn write(&self, path: &Path, content: &[u8]) -> io::Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, content).await
    }

    async fn remove(&self, path: &Path) -> io::Result<()> {
        tokio::fs::remove_file(path).await
    }
}

/// Output directories; file names derive from the class name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    pub csv_dir: PathBuf,
    pub scripts_dir: PathBuf,
}

impl OutputLayout {
    pub fn csv_path(&self, class_name: &str) -> PathBuf {
        self.csv_dir.join(format!("{class_name}.csv"))
    }

    pub fn record_path(&self, class_name: &str) -> PathBuf {
        self.scripts_dir.join(format!("{class_name}.cs"))
    }

    pub fn collection_path(&self, class_name: &str) -> PathBuf {
        self.scripts_dir
            .join(format!("{}.cs", crate::codegen::collection_class_name(class_name)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Written,
    /// Existing file already had identical contents.
    Unchanged,
    /// The user declined to overwrite.
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairOutcome {
    pub record: WriteOutcome,
    pub collection: WriteOutcome,
}

enum Plan {
    Skip(WriteOutcome),
    Write { previous: Option<Vec<u8>> },
}

async fn plan_write<W, P>(writer: &W, prompt: &P, path: &Path, content: &str) -> SheetResult<Plan>
where
    W: ArtifactWriter,
    P: ConfirmOverwrite + ?Sized,
{
    let existing = writer
        .read(path)
        .await
        .map_err(|source| SheetError::io(path, source))?;
    match existing {
        None => Ok(Plan::Write { previous: None }),
        Some(bytes) if bytes == content.as_bytes() => Ok(Plan::Skip(WriteOutcome::Unchanged)),
        Some(bytes) => {
            let label = path.display().to_string();
            if prompt.confirm_overwrite(&label) {
                Ok(Plan::Write {
                    previous: Some(bytes),
                })
            } else {
                tracing::warn!(path = %label, "overwrite declined");
                Ok(Plan::Skip(WriteOutcome::Cancelled))
            }
        }
    }
}

async fn put<W: ArtifactWriter>(writer: &W, path: &Path, content: &str) -> SheetResult<()> {
    writer
        .write(path, content.as_bytes())
        .await
        .map_err(|source| SheetError::io(path, source))?;
    tracing::info!(path = %path.display(), bytes = content.len(), "wrote artifact");
    Ok(())
}

/// Persist the clean data CSV as `<csv_dir>/<Class>.csv`.
pub async fn write_csv<W, P>(
    writer: &W,
    prompt: &P,
    layout: &OutputLayout,
    import: &SheetImport,
) -> SheetResult<WriteOutcome>
where
    W: ArtifactWriter,
    P: ConfirmOverwrite + ?Sized,
{
    let path = layout.csv_path(&import.class_name);
    match plan_write(writer, prompt, &path, &import.csv).await? {
        Plan::Skip(outcome) => Ok(outcome),
        Plan::Write { .. } => {
            put(writer, &path, &import.csv).await?;
            Ok(WriteOutcome::Written)
        }
    }
}

/// Persist the record and collection sources into `scripts_dir`.
///
/// If the collection write fails after the record was written, the record
/// file is put back the way it was (removed, or restored to its old contents).
pub async fn write_sources<W, P>(
    writer: &W,
    prompt: &P,
    layout: &OutputLayout,
    sources: &GeneratedSources,
) -> SheetResult<PairOutcome>
where
    W: ArtifactWriter,
    P: ConfirmOverwrite + ?Sized,
{
    let record_path = layout.record_path(&sources.class_name);
    let collection_path = layout.collection_path(&sources.class_name);

    let record_plan = plan_write(writer, prompt, &record_path, &sources.record).await?;
    let collection_plan =
        plan_write(writer, prompt, &collection_path, &sources.collection).await?;

    let (record, record_previous) = match record_plan {
        Plan::Skip(outcome) => (outcome, None),
        Plan::Write { previous } => {
            put(writer, &record_path, &sources.record).await?;
            (WriteOutcome::Written, Some(previous))
        }
    };

    let collection = match collection_plan {
        Plan::Skip(outcome) => outcome,
        Plan::Write { .. } => {
            if let Err(err) = put(writer, &collection_path, &sources.collection).await {
                if let Some(previous) = record_previous {
                    rollback(writer, &record_path, previous).await;
                }
                return Err(err);
            }
            WriteOutcome::Written
        }
    };

    Ok(PairOutcome { record, collection })
}

async fn rollback<W: ArtifactWriter>(writer: &W, path: &Path, previous: Option<Vec<u8>>) {
    tracing::warn!(path = %path.display(), "rolling back partially written pair");
    let restored = match previous {
        Some(bytes) => writer.write(path, &bytes).await,
        None => writer.remove(path).await,
    };
    if let Err(e) = restored {
        tracing::warn!(path = %path.display(), error = %e, "rollback failed");
    }
}
