use clap::{Arg, ArgAction, ArgGroup, ArgMatches, Command};
use sheet_codegen::{
    export_url, generate_sources, import_sheet, load_document, write_csv, write_sources,
    AlwaysOverwrite, ConfirmOverwrite, FsWriter, OutputLayout, SheetFetcher, WriteOutcome,
    DEFAULT_TIMEOUT,
};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Asks on the terminal before replacing an existing file.
struct StdinPrompt;

impl ConfirmOverwrite for StdinPrompt {
    fn confirm_overwrite(&self, resource_label: &str) -> bool {
        eprint!("{resource_label} already exists. Overwrite? [y/N] ");
        let _ = io::stderr().flush();
        let mut answer = String::new();
        if io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
    }
}

fn source_args(cmd: Command) -> Command {
    cmd.arg(Arg::new("url").long("url").help("Spreadsheet sharing URL"))
        .arg(
            Arg::new("path")
                .long("path")
                .help("Local .csv, .csv.gz or .csv.zst export")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("charset")
                .long("charset")
                .help("Encoding of a local file (e.g. windows-1252)")
                .default_value("utf-8"),
        )
        .arg(
            Arg::new("yes")
                .long("yes")
                .short('y')
                .help("Overwrite existing files without asking")
                .action(ArgAction::SetTrue),
        )
        .group(
            ArgGroup::new("source")
                .args(["url", "path"])
                .required(true),
        )
}

fn cli() -> Command {
    Command::new("sheetgen")
        .about("Import spreadsheet CSV exports and generate C# data containers")
        .subcommand_required(true)
        .arg(
            Arg::new("csv-dir")
                .long("csv-dir")
                .env("SHEETGEN_CSV_DIR")
                .global(true)
                .value_parser(clap::value_parser!(PathBuf))
                .default_value("Assets/Resources/Data"),
        )
        .arg(
            Arg::new("scripts-dir")
                .long("scripts-dir")
                .env("SHEETGEN_SCRIPTS_DIR")
                .global(true)
                .value_parser(clap::value_parser!(PathBuf))
                .default_value("Assets/Scripts/Data"),
        )
        .subcommand(source_args(
            Command::new("import").about("Write the data rows as <csv-dir>/<Sheet>.csv"),
        ))
        .subcommand(source_args(
            Command::new("generate")
                .about("Write <Sheet>.cs and <Sheet>Collection.cs into <scripts-dir>"),
        ))
        .subcommand(
            Command::new("export-url")
                .about("Print the CSV export URL for a sharing URL")
                .arg(Arg::new("url").required(true)),
        )
}

async fn load(matches: &ArgMatches) -> anyhow::Result<String> {
    if let Some(url) = matches.get_one::<String>("url") {
        return Ok(SheetFetcher::new(DEFAULT_TIMEOUT)?.fetch(url).await?);
    }
    let path = matches
        .get_one::<PathBuf>("path")
        .ok_or_else(|| anyhow::anyhow!("provide --url or --path"))?;
    let label = matches
        .get_one::<String>("charset")
        .map(String::as_str)
        .unwrap_or("utf-8");
    let charset = encoding_rs::Encoding::for_label(label.as_bytes())
        .ok_or_else(|| anyhow::anyhow!("unknown charset '{label}'"))?;
    Ok(load_document(path, charset).await?)
}

fn prompt(matches: &ArgMatches) -> Box<dyn ConfirmOverwrite> {
    if matches.get_flag("yes") {
        Box::new(AlwaysOverwrite)
    } else {
        Box::new(StdinPrompt)
    }
}

// global args are propagated into subcommand matches
fn layout(matches: &ArgMatches) -> OutputLayout {
    OutputLayout {
        csv_dir: matches
            .get_one::<PathBuf>("csv-dir")
            .cloned()
            .unwrap_or_default(),
        scripts_dir: matches
            .get_one::<PathBuf>("scripts-dir")
            .cloned()
            .unwrap_or_default(),
    }
}

fn report(what: &str, outcome: WriteOutcome) {
    match outcome {
        WriteOutcome::Written => println!("{what}: written"),
        WriteOutcome::Unchanged => println!("{what}: unchanged"),
        WriteOutcome::Cancelled => println!("{what}: cancelled"),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    let matches = cli().get_matches();

    match matches.subcommand() {
        Some(("import", sub)) => {
            let layout = layout(sub);
            let doc = load(sub).await?;
            let import = import_sheet(&doc)?;
            let outcome = write_csv(&FsWriter, prompt(sub).as_ref(), &layout, &import).await?;
            report(&layout.csv_path(&import.class_name).display().to_string(), outcome);
        }
        Some(("generate", sub)) => {
            let layout = layout(sub);
            let doc = load(sub).await?;
            let sources = generate_sources(&doc)?;
            let outcome =
                write_sources(&FsWriter, prompt(sub).as_ref(), &layout, &sources).await?;
            report(
                &layout.record_path(&sources.class_name).display().to_string(),
                outcome.record,
            );
            report(
                &layout.collection_path(&sources.class_name).display().to_string(),
                outcome.collection,
            );
        }
        Some(("export-url", sub)) => {
            let url = sub
                .get_one::<String>("url")
                .ok_or_else(|| anyhow::anyhow!("missing url"))?;
            println!("{}", export_url(url)?);
        }
        _ => unreachable!("subcommand_required"),
    }
    Ok(())
}
