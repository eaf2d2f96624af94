/// Per-locale diff between the stored values of a key and an edited version
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// Locale tag, derived from a catalog file name.
pub type Locale = String;

/// Values of one key, by locale. A missing locale means "not defined".
pub type LocaleValues = BTreeMap<Locale, Value>;

/// One locale's required mutation for a key.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ChangeRecord {
    Added {
        locale: Locale,
        new_value: Value,
    },
    Updated {
        locale: Locale,
        old_value: Value,
        new_value: Value,
    },
    Deleted {
        locale: Locale,
        old_value: Value,
    },
}

impl ChangeRecord {
    pub fn locale(&self) -> &str {
        match self {
            Self::Added { locale, .. } | Self::Updated { locale, .. } | Self::Deleted { locale, .. } => locale,
        }
    }

    /// Value the locale holds after the change, `None` for a deletion.
    pub fn new_value(&self) -> Option<&Value> {
        match self {
            Self::Added { new_value, .. } | Self::Updated { new_value, .. } => Some(new_value),
            Self::Deleted { .. } => None,
        }
    }

    /// Value the locale held before the change, `None` for an addition.
    pub fn old_value(&self) -> Option<&Value> {
        match self {
            Self::Updated { old_value, .. } | Self::Deleted { old_value, .. } => Some(old_value),
            Self::Added { .. } => None,
        }
    }
}

/// Compare `old` and `new` for every locale in `all_locales`, in that order.
///
/// Values are compared structurally; locales outside `all_locales` are not
/// considered.
pub fn diff(old: &LocaleValues, new: &LocaleValues, all_locales: &[Locale]) -> Vec<ChangeRecord> {
    let mut changes = Vec::new();

    for locale in all_locales {
        match (old.get(locale), new.get(locale)) {
            (None, None) => {}
            (Some(o), Some(n)) if o == n => {}
            (None, Some(n)) => changes.push(ChangeRecord::Added {
                locale: locale.clone(),
                new_value: n.clone(),
            }),
            (Some(o), None) => changes.push(ChangeRecord::Deleted {
                locale: locale.clone(),
                old_value: o.clone(),
            }),
            (Some(o), Some(n)) => changes.push(ChangeRecord::Updated {
                locale: locale.clone(),
                old_value: o.clone(),
                new_value: n.clone(),
            }),
        }
    }

    changes
}
