/// Filters over flattened translation items
use crate::dictionary::TranslationItem;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which part of an item a filter pattern is matched against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterCriterion {
    #[default]
    Key,
    Locale,
    Value,
}

impl FilterCriterion {
    pub const ALL: [FilterCriterion; 3] = [Self::Key, Self::Locale, Self::Value];

    fn position(self) -> usize {
        Self::ALL.iter().position(|c| *c == self).unwrap_or(0)
    }

    /// Following criterion, wrapping around.
    pub fn next(self) -> Self {
        Self::ALL[(self.position() + 1) % Self::ALL.len()]
    }

    /// Preceding criterion, wrapping around.
    pub fn previous(self) -> Self {
        Self::ALL[(self.position() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

impl fmt::Display for FilterCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key => f.write_str("KEY"),
            Self::Locale => f.write_str("LOCALE"),
            Self::Value => f.write_str("VALUE"),
        }
    }
}

impl FromStr for FilterCriterion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "key" => Ok(Self::Key),
            "locale" | "lang" | "language" => Ok(Self::Locale),
            "value" | "text" => Ok(Self::Value),
            other => Err(format!("unknown filter criterion '{other}' (expected key, locale or value)")),
        }
    }
}

/// Case-insensitive substring filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    pub criterion: FilterCriterion,
    pub pattern: String,
}

impl Filter {
    pub fn new(criterion: FilterCriterion, pattern: impl Into<String>) -> Self {
        Self {
            criterion,
            pattern: pattern.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pattern.is_empty()
    }

    pub fn matches(&self, item: &TranslationItem) -> bool {
        if self.pattern.is_empty() {
            return true;
        }

        let needle = self.pattern.to_lowercase();
        let haystack = match self.criterion {
            FilterCriterion::Key => item.key.to_lowercase(),
            FilterCriterion::Locale => item.locale.to_lowercase(),
            FilterCriterion::Value => item.display_value().to_lowercase(),
        };
        haystack.contains(&needle)
    }
}
