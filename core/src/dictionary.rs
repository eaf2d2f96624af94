/// Cross-locale dictionary: key → {locale → value}
use crate::diff::{Locale, LocaleValues};
use crate::reader::Catalog;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// One (key, locale, value) triple of the flattened read model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranslationItem {
    pub key: String,
    pub locale: Locale,
    pub value: Value,
}

impl TranslationItem {
    /// Strings without quotes, everything else as compact JSON.
    pub fn display_value(&self) -> String {
        match &self.value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

/// Read-only merged view over all catalogs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dictionary {
    entries: BTreeMap<String, LocaleValues>,
}

impl Dictionary {
    pub fn build(catalogs: &BTreeMap<Locale, Catalog>) -> Self {
        let mut entries: BTreeMap<String, LocaleValues> = BTreeMap::new();
        for (locale, catalog) in catalogs {
            for (key, value) in &catalog.entries {
                entries
                    .entry(key.clone())
                    .or_default()
                    .insert(locale.clone(), value.clone());
            }
        }
        Self { entries }
    }

    pub fn get(&self, key: &str) -> Option<&LocaleValues> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// All keys, sorted.
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.entries.keys()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Flattened triples ordered by key, then locale.
    pub fn items(&self) -> Vec<TranslationItem> {
        self.entries
            .iter()
            .flat_map(|(key, values)| {
                values.iter().map(move |(locale, value)| TranslationItem {
                    key: key.clone(),
                    locale: locale.clone(),
                    value: value.clone(),
                })
            })
            .collect()
    }

    /// Locales of `all_locales` that do not define `key`.
    pub fn missing_locales<'a>(&self, key: &str, all_locales: &'a [Locale]) -> Vec<&'a Locale> {
        let defined = self.entries.get(key);
        all_locales
            .iter()
            .filter(|locale| defined.map_or(true, |values| !values.contains_key(*locale)))
            .collect()
    }
}
