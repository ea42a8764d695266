use sheet_codegen::{
    extract_schema, generate_collection_source, generate_record_source, generate_sources,
    import_sheet, load_document, slice_data_rows, write_csv, write_sources, AlwaysOverwrite,
    ArtifactWriter, FsWriter, NeverOverwrite, OutputLayout, SheetError, WriteOutcome,
};
use std::path::Path;
use std::process::Command;

const ITEMS: &str = "Item\nName,Hp\nstring,int\nItem,Sword,10\nItem,\"Shield, small\",4\n";

fn layout(root: &Path) -> OutputLayout {
    OutputLayout {
        csv_dir: root.join("data"),
        scripts_dir: root.join("scripts"),
    }
}

#[test]
fn slicing_drops_headers_and_sheet_column() {
    let doc = "sheet,a,b\nnames,f1,f2\ntypes,string,int\nS1,1,2\nS1,3,4\n";
    assert_eq!(slice_data_rows(doc), "1,2\n3,4");
}

#[test]
fn slicing_skips_blank_and_degenerate_rows() {
    let doc = "Item\nName\nstring\n   \nItem,a\nlonely\n\r\nItem,b\n";
    assert_eq!(slice_data_rows(doc), "a\nb");
}

#[test]
fn sliced_rows_rebuild_the_same_schema() {
    let doc = "Item\nName,Hp\nstring,int\nItem,Sword,10\nItem,Axe,12\n";
    let sliced = slice_data_rows(doc);

    let mut rebuilt: Vec<String> = doc.lines().take(3).map(str::to_string).collect();
    rebuilt.extend(sliced.lines().map(|row| format!("Item,{row}")));
    let rebuilt = rebuilt.join("\n");

    assert_eq!(extract_schema(&rebuilt).unwrap(), extract_schema(doc).unwrap());
    assert_eq!(slice_data_rows(&rebuilt), sliced);
}

#[test]
fn record_source_is_deterministic_and_ordered() {
    let names = vec!["Name".to_string(), "Hp".to_string()];
    let types = vec!["string".to_string(), "int".to_string()];

    let first = generate_record_source("Item", &names, &types);
    let second = generate_record_source("Item", &names, &types);
    assert_eq!(first, second);

    let name_at = first.find("public string name;").unwrap();
    let hp_at = first.find("public int hp;").unwrap();
    assert!(name_at < hp_at);
    assert!(first.contains("[Serializable]\npublic class Item\n{\n"));
    assert!(!first.contains("UnityEngine"));
}

#[test]
fn vector_fields_pull_in_unity() {
    let source = generate_record_source(
        "Spawn",
        &["Position".to_string()],
        &["Vector3".to_string()],
    );
    assert!(source.contains("using UnityEngine;"));
    assert!(source.contains("    public Vector3 position;\n"));
}

#[test]
fn collection_wraps_a_list_of_records() {
    let source = generate_collection_source("Item");
    assert!(source.contains("public class ItemCollection"));
    assert!(source.contains("    public List<Item> items = new List<Item>();\n"));
    assert!(source.contains("using System.Collections.Generic;"));
}

#[test]
fn generate_pipeline_uses_normalized_names() {
    let doc = "enemy\nmaxHp,speed\nint,float\nenemy,10,1.5\n";
    let sources = generate_sources(doc).unwrap();
    assert_eq!(sources.class_name, "Enemy");
    assert!(sources.record.contains("public int maxHp;"));
    assert!(sources.record.contains("public float speed;"));
    assert_eq!(sources.fingerprint(), generate_sources(doc).unwrap().fingerprint());
}

#[test]
fn import_pipeline_refuses_invalid_sheets() {
    let doc = "Item\nclass,_x\nstring,text\nItem,a,b\n";
    assert!(matches!(
        import_sheet(doc),
        Err(SheetError::InvalidSchema(_))
    ));
}

#[tokio::test]
async fn import_writes_clean_csv() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let layout = layout(dir.path());

    let import = import_sheet(ITEMS)?;
    let outcome = write_csv(&FsWriter, &AlwaysOverwrite, &layout, &import).await?;
    assert_eq!(outcome, WriteOutcome::Written);

    let written = std::fs::read_to_string(dir.path().join("data/Item.csv"))?;
    assert_eq!(written, "Sword,10\nShield, small,4");

    // same content again is a no-op, even when overwrites are refused
    let again = write_csv(&FsWriter, &NeverOverwrite, &layout, &import).await?;
    assert_eq!(again, WriteOutcome::Unchanged);
    Ok(())
}

#[tokio::test]
async fn declined_overwrite_leaves_file_alone() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let layout = layout(dir.path());
    std::fs::create_dir_all(&layout.scripts_dir)?;
    std::fs::write(layout.record_path("Item"), "// hand edited\n")?;

    let sources = generate_sources(ITEMS)?;
    let outcome = write_sources(&FsWriter, &NeverOverwrite, &layout, &sources).await?;
    assert_eq!(outcome.record, WriteOutcome::Cancelled);
    assert_eq!(outcome.collection, WriteOutcome::Written);
    assert_eq!(
        std::fs::read_to_string(layout.record_path("Item"))?,
        "// hand edited\n"
    );
    Ok(())
}

/// Fails every write whose file name ends with `Collection.cs`.
struct FailingCollection;

impl ArtifactWriter for FailingCollection {
    async fn read(&self, path: &Path) -> std::io::Result<Option<Vec<u8>>> {
        FsWriter.read(path).await
    }

    async fn write(&self, path: &Path, content: &[u8]) -> std::io::Result<()> {
        if path.to_string_lossy().ends_with("Collection.cs") {
            return Err(std::io::Error::other("disk full"));
        }
        FsWriter.write(path, content).await
    }

    async fn remove(&self, path: &Path) -> std::io::Result<()> {
        FsWriter.remove(path).await
    }
}

#[tokio::test]
async fn failed_collection_write_removes_new_record() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let layout = layout(dir.path());

    let sources = generate_sources(ITEMS)?;
    let err = write_sources(&FailingCollection, &AlwaysOverwrite, &layout, &sources)
        .await
        .unwrap_err();
    assert!(matches!(err, SheetError::Io { .. }));
    assert!(!layout.record_path("Item").exists());
    assert!(!layout.collection_path("Item").exists());
    Ok(())
}

#[tokio::test]
async fn failed_collection_write_restores_old_record() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let layout = layout(dir.path());
    std::fs::create_dir_all(&layout.scripts_dir)?;
    std::fs::write(layout.record_path("Item"), "// previous\n")?;

    let sources = generate_sources(ITEMS)?;
    let result = write_sources(&FailingCollection, &AlwaysOverwrite, &layout, &sources).await;
    assert!(result.is_err());
    assert_eq!(
        std::fs::read_to_string(layout.record_path("Item"))?,
        "// previous\n"
    );
    Ok(())
}

#[tokio::test]
async fn loads_gzip_export() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let csv_path = dir.path().join("items.csv");
    std::fs::write(&csv_path, ITEMS)?;

    // gzip it (use system gzip)
    let gz_path = dir.path().join("items.csv.gz");
    let status = Command::new("bash")
        .arg("-lc")
        .arg(format!(
            "gzip -c {} > {}",
            csv_path.display(),
            gz_path.display()
        ))
        .status()?;
    assert!(status.success());

    let doc = load_document(&gz_path, encoding_rs::UTF_8).await?;
    assert_eq!(doc, ITEMS);
    assert_eq!(import_sheet(&doc)?.csv, "Sword,10\nShield, small,4");
    Ok(())
}

#[tokio::test]
async fn loads_windows_1252_export() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("cafe.csv");
    std::fs::write(&path, b"Menu\nName\nstring\nMenu,caf\xe9\n")?;

    let doc = load_document(&path, encoding_rs::WINDOWS_1252).await?;
    assert_eq!(import_sheet(&doc)?.csv, "café");
    Ok(())
}

#[tokio::test]
async fn missing_file_reports_its_path() {
    let err = load_document(Path::new("/nonexistent/sheet.csv"), encoding_rs::UTF_8)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("/nonexistent/sheet.csv"));
}

#[test]
fn header_rows_keep_their_first_column() {
    // only data rows carry a leading sheet column
    let doc = "sheet,a,b\nnames,f1,f2\ntypes,string,int\nS1,1,2\n";
    let schema = extract_schema(doc).unwrap();
    assert_eq!(schema.field_names, vec!["names", "f1", "f2"]);

    let err = import_sheet(doc).unwrap_err();
    assert!(err.to_string().contains("Column 1: 'types'"), "{err}");
}
