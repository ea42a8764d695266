//! Field name and field type checks.
//!
//! Both validators scan every field and report all offenders at once.
//! Neither touches its input; the name validator hands back the
//! normalized names instead.

use crate::schema::{capitalize, decapitalize, Schema, SupportedType};
use crate::{SheetError, SheetResult};
use once_cell::sync::Lazy;
use std::collections::HashSet;
use std::fmt;

/// C# reserved keywords. Contextual keywords (`value`, `get`, `var`, ...) are
/// legal field identifiers and stay out of this table.
static RESERVED_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "abstract", "as", "base", "bool", "break", "byte", "case", "catch", "char", "checked",
        "class", "const", "continue", "decimal", "default", "delegate", "do", "double", "else",
        "enum", "event", "explicit", "extern", "false", "finally", "fixed", "float", "for",
        "foreach", "goto", "if", "implicit", "in", "int", "interface", "internal", "is", "lock",
        "long", "namespace", "new", "null", "object", "operator", "out", "override", "params",
        "private", "protected", "public", "readonly", "ref", "return", "sbyte", "sealed",
        "short", "sizeof", "stackalloc", "static", "string", "struct", "switch", "this",
        "throw", "true", "try", "typeof", "uint", "ulong", "unchecked", "unsafe", "ushort",
        "using", "virtual", "void", "volatile", "while",
    ]
    .into_iter()
    .collect()
});

/// Case-insensitive lookup in the reserved word table.
pub fn is_reserved_word(name: &str) -> bool {
    RESERVED_WORDS.contains(name.to_ascii_lowercase().as_str())
}

/// Why a field name was rejected. Checked in declaration order; first hit wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameRule {
    EmptyName,
    LeadingUnderscore,
    TrailingUnderscore,
    LeadingDigit,
    InvalidCharacter,
    ReservedWord,
    /// Same generated identifier as an earlier field (`hp` vs `Hp`).
    DuplicateName,
}

impl fmt::Display for NameRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            NameRule::EmptyName => "field name is empty",
            NameRule::LeadingUnderscore => "field name must not start with '_'",
            NameRule::TrailingUnderscore => "field name must not end with '_'",
            NameRule::LeadingDigit => "field name must not start with a digit",
            NameRule::InvalidCharacter => {
                "field name may only contain letters, digits and '_'"
            }
            NameRule::ReservedWord => "field name is a reserved word",
            NameRule::DuplicateName => "field name duplicates an earlier field",
        };
        f.write_str(reason)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameIssue {
    /// Field text as it appeared in the sheet.
    pub field: String,
    pub rule: NameRule,
}

impl fmt::Display for NameIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}': {}", self.field, self.rule)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeIssue {
    /// 1-based column index.
    pub column: usize,
    pub value: String,
}

impl fmt::Display for TypeIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Column {}: '{}' (supported types: {})",
            self.column,
            self.value,
            SupportedType::supported_list()
        )
    }
}

/// Returns the first rule `name` breaks, if any.
pub fn check_name(name: &str) -> Option<NameRule> {
    let name = name.trim();
    let Some(first) = name.chars().next() else {
        return Some(NameRule::EmptyName);
    };
    let rule = if first == '_' {
        NameRule::LeadingUnderscore
    } else if name.ends_with('_') {
        NameRule::TrailingUnderscore
    } else if first.is_ascii_digit() {
        NameRule::LeadingDigit
    } else if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        NameRule::InvalidCharacter
    } else if is_reserved_word(name) {
        NameRule::ReservedWord
    } else {
        return None;
    };
    Some(rule)
}

/// Validate every field name; on success return them capitalized, in order.
pub fn validate_names(names: &[String]) -> SheetResult<Vec<String>> {
    // generated identifiers only differ from the sheet text in the first letter
    let mut seen = HashSet::new();
    let issues: Vec<NameIssue> = names
        .iter()
        .filter_map(|name| {
            let rule = check_name(name).or_else(|| {
                (!seen.insert(decapitalize(name.trim()))).then_some(NameRule::DuplicateName)
            });
            rule.map(|rule| NameIssue {
                field: name.clone(),
                rule,
            })
        })
        .collect();

    if !issues.is_empty() {
        return Err(SheetError::NameValidationFailed(issues));
    }
    Ok(names.iter().map(|n| capitalize(n.trim())).collect())
}

/// Validate every field type against [`SupportedType`].
pub fn validate_types(types: &[String]) -> SheetResult<Vec<SupportedType>> {
    let mut parsed = Vec::with_capacity(types.len());
    let mut issues = Vec::new();
    for (i, raw) in types.iter().enumerate() {
        match raw.trim().parse::<SupportedType>() {
            Ok(ty) => parsed.push(ty),
            Err(()) => issues.push(TypeIssue {
                column: i + 1,
                value: raw.clone(),
            }),
        }
    }

    if !issues.is_empty() {
        return Err(SheetError::TypeValidationFailed(issues));
    }
    Ok(parsed)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// Capitalized storage name.
    pub name: String,
    pub ty: SupportedType,
}

/// A schema whose names and types both passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedSchema {
    pub class_name: String,
    pub fields: Vec<Field>,
}

impl ValidatedSchema {
    pub fn field_names(&self) -> Vec<String> {
        self.fields.iter().map(|f| f.name.clone()).collect()
    }

    pub fn field_types(&self) -> Vec<String> {
        self.fields.iter().map(|f| f.ty.as_str().to_string()).collect()
    }
}

impl Schema {
    /// Run both validators to completion and combine their verdicts.
    ///
    /// When both fail the error is [`SheetError::InvalidSchema`] carrying
    /// the name failure followed by the type failure.
    pub fn validate(&self) -> SheetResult<ValidatedSchema> {
        let names = validate_names(&self.field_names);
        let types = validate_types(&self.field_types);

        match (names, types) {
            (Ok(names), Ok(types)) => Ok(ValidatedSchema {
                class_name: self.sheet_name.clone(),
                fields: names
                    .into_iter()
                    .zip(types)
                    .map(|(name, ty)| Field { name, ty })
                    .collect(),
            }),
            (Err(e), Ok(_)) | (Ok(_), Err(e)) => Err(e),
            (Err(names), Err(types)) => Err(SheetError::InvalidSchema(vec![names, types])),
        }
    }
}
