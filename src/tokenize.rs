/// Split a raw document into lines on CR/LF, dropping empty ones.
///
/// Whitespace-only lines are kept here; callers that care skip them.
pub fn split_lines(doc: &str) -> Vec<&str> {
    doc.split(['\r', '\n']).filter(|l| !l.is_empty()).collect()
}

/// Quote-aware split of a single CSV line into trimmed cells.
///
/// A `"` toggles the quoted state and is never emitted. Commas inside a
/// quoted span are kept as data. There is always one more cell than
/// there are unquoted commas, so an empty line yields `[""]`.
pub fn tokenize(line: &str) -> Vec<String> {
    let mut cells = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for ch in line.chars() {
        match ch {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                cells.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(ch),
        }
    }
    // last field
    cells.push(current.trim().to_string());
    cells
}
