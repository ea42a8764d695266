use clap::{Arg, Command};
use std::io::{self, Write};

const TYPES: [&str; 5] = ["string", "int", "float", "bool", "Vector3"];

fn main() -> anyhow::Result<()> {
    let matches = Command::new("gen")
        .about("Emit a synthetic sheet-shaped CSV (name row, field row, type row, data)")
        .arg(
            Arg::new("rows")
                .long("rows")
                .value_parser(clap::value_parser!(u64))
                .required(true),
        )
        .arg(
            Arg::new("cols")
                .long("cols")
                .value_parser(clap::value_parser!(usize))
                .default_value("3"),
        )
        .arg(Arg::new("sheet").long("sheet").default_value("Item"))
        .get_matches();

    let rows: u64 = *matches.get_one("rows").unwrap();
    let cols: usize = *matches.get_one("cols").unwrap();
    let sheet = matches.get_one::<String>("sheet").unwrap();

    let mut out = io::BufWriter::new(io::stdout().lock());

    writeln!(&mut out, "{sheet}")?;
    // Header rows have no sheet column; data rows lead with one
    let names: Vec<String> = (0..cols).map(|c| format!("Field{c}")).collect();
    let types: Vec<&str> = (0..cols).map(|c| TYPES[c % TYPES.len()]).collect();
    writeln!(&mut out, "{}", names.join(","))?;
    writeln!(&mut out, "{}", types.join(","))?;

    // Deterministic values that parse as their column's type
    for i in 0..rows {
        write!(&mut out, "{sheet}")?;
        for c in 0..cols {
            match TYPES[c % TYPES.len()] {
                "string" => write!(&mut out, ",v{c}_{i}")?,
                "int" => write!(&mut out, ",{i}")?,
                "float" => write!(&mut out, ",{i}.5")?,
                "bool" => write!(&mut out, ",{}", i % 2 == 0)?,
                _ => write!(&mut out, ",\"({i}, {c}, 0)\"")?,
            }
        }
        writeln!(&mut out)?;
        if i % 10_000 == 0 {
            out.flush()?;
        }
    }

    out.flush()?;
    Ok(())
}
