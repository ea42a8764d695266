//! C# source generation for Unity-style serializable data containers.
//!
//! Output is a pure function of the inputs so regenerated files diff cleanly.

use crate::schema::{decapitalize, SupportedType};
use crate::validate::ValidatedSchema;

const INDENT: &str = "    ";

/// Line-oriented source builder with indentation handling.
#[derive(Debug, Default, Clone)]
struct SourceBuilder {
    content: String,
    indent_level: usize,
}

impl SourceBuilder {
    fn push_line(&mut self, line: &str) {
        if !line.is_empty() {
            for _ in 0..self.indent_level {
                self.content.push_str(INDENT);
            }
            self.content.push_str(line);
        }
        self.content.push('\n');
    }

    fn open_block(&mut self) {
        self.push_line("{");
        self.indent_level += 1;
    }

    fn close_block(&mut self) {
        self.indent_level = self.indent_level.saturating_sub(1);
        self.push_line("}");
    }

    fn header(&mut self, usings: &[&str]) {
        self.push_line("// <auto-generated>");
        self.push_line("// Generated from a spreadsheet export. Edits will be lost on regeneration.");
        self.push_line("// </auto-generated>");
        for using in usings {
            self.push_line(&format!("using {using};"));
        }
        self.push_line("");
    }

    fn build(self) -> String {
        self.content
    }
}

/// Name of the wrapper type holding a list of `class_name` records.
pub fn collection_class_name(class_name: &str) -> String {
    format!("{class_name}Collection")
}

/// Record definition: one public field per `(name, type)` pair, in order.
///
/// Field identifiers get a lower-case first character; types are used verbatim.
pub fn generate_record_source(
    class_name: &str,
    field_names: &[String],
    field_types: &[String],
) -> String {
    let needs_unity = field_types
        .iter()
        .any(|t| t == SupportedType::Vector3.as_str());
    let usings: &[&str] = if needs_unity {
        &["System", "UnityEngine"]
    } else {
        &["System"]
    };

    let mut b = SourceBuilder::default();
    b.header(usings);
    b.push_line("[Serializable]");
    b.push_line(&format!("public class {class_name}"));
    b.open_block();
    for (name, ty) in field_names.iter().zip(field_types) {
        b.push_line(&format!("public {ty} {};", decapitalize(name)));
    }
    b.close_block();
    b.build()
}

/// Collection definition: a single `items` list, initialised empty.
pub fn generate_collection_source(class_name: &str) -> String {
    let mut b = SourceBuilder::default();
    b.header(&["System", "System.Collections.Generic"]);
    b.push_line("[Serializable]");
    b.push_line(&format!(
        "public class {}",
        collection_class_name(class_name)
    ));
    b.open_block();
    b.push_line(&format!(
        "public List<{class_name}> items = new List<{class_name}>();"
    ));
    b.close_block();
    b.build()
}

/// Record and collection sources for an already validated schema.
pub fn generate_for_schema(schema: &ValidatedSchema) -> (String, String) {
    let record = generate_record_source(
        &schema.class_name,
        &schema.field_names(),
        &schema.field_types(),
    );
    let collection = generate_collection_source(&schema.class_name);
    (record, collection)
}
