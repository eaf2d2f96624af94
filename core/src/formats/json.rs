/// JSON catalog handler
/// The whole file is one flat object; every change rewrites it from the
/// entries, grouped by namespace and sorted.

use super::{CatalogFormat, CatalogHandler, Entries, FormatError};
use crate::diff::ChangeRecord;
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use serde_json::Value;
use std::collections::BTreeMap;

const INDENT: &str = "    ";

pub struct JsonHandler;

impl JsonHandler {
    pub fn new() -> Self {
        Self
    }
}

impl Default for JsonHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl CatalogHandler for JsonHandler {
    fn read(&self, content: &str) -> Result<Entries, FormatError> {
        if content.trim().is_empty() {
            return Ok(Entries::new());
        }
        serde_json::from_str(content)
            .map_err(|e| FormatError::ParseError(format!("JSON parse error: {}", e)))
    }

    fn apply(
        &self,
        _content: &str,
        _key: &str,
        _change: &ChangeRecord,
        entries_after: &Entries,
    ) -> Result<String, FormatError> {
        render_grouped(entries_after)
    }

    fn rename(
        &self,
        _content: &str,
        _old_key: &str,
        _new_key: &str,
        entries_after: &Entries,
    ) -> Result<String, FormatError> {
        render_grouped(entries_after)
    }

    fn format(&self) -> CatalogFormat {
        CatalogFormat::FlatObject
    }
}

/// Namespace of a key: the part before the first `.`, empty when undotted.
pub fn namespace_of(key: &str) -> &str {
    key.split_once('.').map(|(ns, _)| ns).unwrap_or("")
}

/// Render entries as one flat JSON object with 4-space indentation.
///
/// Keys are grouped by namespace (undotted keys first), groups are separated
/// by a blank line, and keys are sorted within each group. The output only
/// depends on the entries, not on their order.
pub fn render_grouped(entries: &Entries) -> Result<String, FormatError> {
    if entries.is_empty() {
        return Ok("{}\n".to_string());
    }

    let mut groups: BTreeMap<&str, Vec<(&String, &Value)>> = BTreeMap::new();
    for (key, value) in entries {
        groups.entry(namespace_of(key)).or_default().push((key, value));
    }

    let total = entries.len();
    let mut written = 0;
    let mut out = String::from("{\n");

    for (index, members) in groups.values_mut().enumerate() {
        if index > 0 {
            out.push('\n');
        }
        members.sort_by(|a, b| a.0.cmp(b.0));

        for (key, value) in members.iter() {
            written += 1;
            let key = serde_json::to_string(key)
                .map_err(|e| FormatError::SerializationError(format!("JSON serialize error: {}", e)))?;
            let value = render_value(value)?;

            out.push_str(INDENT);
            out.push_str(&key);
            out.push_str(": ");
            out.push_str(&value.replace('\n', &format!("\n{INDENT}")));
            if written < total {
                out.push(',');
            }
            out.push('\n');
        }
    }

    out.push_str("}\n");
    Ok(out)
}

/// Pretty JSON with 4-space indentation.
pub fn render_value(value: &Value) -> Result<String, FormatError> {
    let mut buffer = Vec::new();
    let mut serializer = Serializer::with_formatter(&mut buffer, PrettyFormatter::with_indent(INDENT.as_bytes()));
    value
        .serialize(&mut serializer)
        .map_err(|e| FormatError::SerializationError(format!("JSON serialize error: {}", e)))?;
    String::from_utf8(buffer).map_err(|e| FormatError::EncodingError(e.to_string()))
}
