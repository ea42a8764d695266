use crate::schema::HEADER_ROWS;
use crate::tokenize::{split_lines, tokenize};

/// Strip the header rows and the leading sheet-name column from a document.
///
/// Blank rows and rows with at most one cell are skipped. Remaining cells
/// are re-joined with `,` (no re-quoting) and rows are joined with `\n`.
pub fn slice_data_rows(doc: &str) -> String {
    let mut rows = Vec::new();
    let mut skipped = 0usize;

    for line in split_lines(doc).into_iter().skip(HEADER_ROWS) {
        if line.trim().is_empty() {
            continue;
        }
        let cells = tokenize(line);
        if cells.len() <= 1 {
            skipped += 1;
            continue;
        }
        rows.push(cells[1..].join(","));
    }

    if skipped > 0 {
        tracing::warn!(skipped, "dropped degenerate data rows");
    }
    rows.join("\n")
}
