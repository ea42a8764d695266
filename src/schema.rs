use crate::tokenize::{split_lines, tokenize};
use crate::{SheetError, SheetResult};
use std::fmt;
use std::str::FromStr;

/// Header rows in front of the data: sheet name, field names, field types.
pub const HEADER_ROWS: usize = 3;

/// Field types a sheet column may declare. Names match the target language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SupportedType {
    String,
    Int,
    Float,
    Bool,
    Vector3,
}

impl SupportedType {
    pub const ALL: [SupportedType; 5] = [
        SupportedType::String,
        SupportedType::Int,
        SupportedType::Float,
        SupportedType::Bool,
        SupportedType::Vector3,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SupportedType::String => "string",
            SupportedType::Int => "int",
            SupportedType::Float => "float",
            SupportedType::Bool => "bool",
            SupportedType::Vector3 => "Vector3",
        }
    }

    /// Comma-joined list used in error messages.
    pub fn supported_list() -> String {
        Self::ALL
            .iter()
            .map(|t| t.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl FromStr for SupportedType {
    type Err = ();

    /// Exact, case-sensitive match. `"String"` is not `string`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or(())
    }
}

impl fmt::Display for SupportedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Header information pulled out of a sheet document, not yet validated.
///
/// `field_names[i]` pairs with `field_types[i]`; both have the same length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    pub sheet_name: String,
    pub field_names: Vec<String>,
    pub field_types: Vec<String>,
}

/// Split a sheet document into its schema.
///
/// Needs at least four non-empty lines (three header rows plus one data row).
pub fn extract_schema(doc: &str) -> SheetResult<Schema> {
    let lines = split_lines(doc);
    if lines.len() <= HEADER_ROWS {
        return Err(SheetError::InsufficientRows { found: lines.len() });
    }

    let first_cell = tokenize(lines[0]).into_iter().next().unwrap_or_default();
    let sheet_name = sanitize_sheet_name(&first_cell);
    if sheet_name.is_empty() {
        return Err(SheetError::EmptySheetName);
    }

    let field_names = tokenize(lines[1]);
    let field_types = tokenize(lines[2]);
    if field_names.len() != field_types.len() {
        return Err(SheetError::FieldCountMismatch {
            names: field_names.len(),
            types: field_types.len(),
        });
    }

    tracing::debug!(
        sheet = %sheet_name,
        fields = field_names.len(),
        data_rows = lines.len() - HEADER_ROWS,
        "extracted schema"
    );

    Ok(Schema {
        sheet_name,
        field_names,
        field_types,
    })
}

/// Keep only `[A-Za-z0-9_]` and upper-case the first remaining character.
pub fn sanitize_sheet_name(raw: &str) -> String {
    let kept: String = raw
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect();
    capitalize(&kept)
}

pub(crate) fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub(crate) fn decapitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}
