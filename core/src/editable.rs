/// Editable text form of one key across all locales
///
/// The text is a comment header naming the key followed by a JSON object
/// with one member per known locale; locales without a value are `null`.
use crate::diff::{Locale, LocaleValues};
use crate::formats::json::render_value;
use crate::formats::FormatError;
use indexmap::IndexMap;
use serde_json::{Map, Value};
use thiserror::Error;

const COMMENT: &str = "//";

/// Locale → edited value; `None` is an explicit null. Locales missing from
/// the edited text are missing here too.
pub type EditedValues = IndexMap<Locale, Option<Value>>;

#[derive(Debug, Error)]
pub enum EditError {
    #[error("edited content is not a JSON object: {0}")]
    Malformed(String),

    #[error("could not render editable content: {0}")]
    Render(#[from] FormatError),
}

/// Render `values` of `key` for editing, one member per locale in
/// `all_locales` order.
pub fn serialize(key: &str, values: Option<&LocaleValues>, all_locales: &[Locale]) -> Result<String, EditError> {
    let mut object = Map::new();
    for locale in all_locales {
        let value = values
            .and_then(|v| v.get(locale))
            .cloned()
            .unwrap_or(Value::Null);
        object.insert(locale.clone(), value);
    }

    let body = render_value(&Value::Object(object))?;
    Ok(format!(
        "{COMMENT} {key}\n{COMMENT} Set a locale to null to remove its translation.\n{body}\n"
    ))
}

/// Parse edited text back into per-locale values.
pub fn parse(edited: &str) -> Result<EditedValues, EditError> {
    let body: String = edited
        .lines()
        .filter(|line| !line.trim_start().starts_with(COMMENT))
        .collect::<Vec<_>>()
        .join("\n");

    let object: IndexMap<Locale, Value> =
        serde_json::from_str(&body).map_err(|e| EditError::Malformed(e.to_string()))?;

    Ok(object
        .into_iter()
        .map(|(locale, value)| match value {
            Value::Null => (locale, None),
            other => (locale, Some(other)),
        })
        .collect())
}

/// New per-locale values after an edit.
///
/// A value replaces the old one, an explicit null removes it, and a locale
/// absent from the edit keeps its old value. Locales outside `all_locales`
/// have no catalog and are skipped.
pub fn resolve(old: Option<&LocaleValues>, edited: &EditedValues, all_locales: &[Locale]) -> LocaleValues {
    let mut resolved = old.cloned().unwrap_or_default();

    for (locale, value) in edited {
        if !all_locales.contains(locale) {
            log::warn!("ignoring unknown locale '{}' in edited content", locale);
            continue;
        }

        match value {
            Some(value) => {
                resolved.insert(locale.clone(), value.clone());
            }
            // a stored null already reads as null
            None if resolved.get(locale) == Some(&Value::Null) => {}
            None => {
                resolved.remove(locale);
            }
        }
    }

    resolved
}
