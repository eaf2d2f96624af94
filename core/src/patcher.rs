/// Applies change records to catalog files
///
/// Each call is one full read and one full write of a single catalog. A
/// failure leaves that file and its in-memory entries unchanged.
use crate::backup::{backup_and_swap, WriteError};
use crate::config::LiteralOptions;
use crate::diff::{ChangeRecord, Locale};
use crate::encoding;
use crate::formats::{get_handler, Entries, FormatError};
use crate::reader::Catalog;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PatchError {
    #[error("no catalog for locale '{0}'")]
    UnknownLocale(Locale),

    #[error("key '{0}' is not defined in this catalog")]
    MissingKey(String),

    #[error(transparent)]
    Format(#[from] FormatError),

    #[error("write failed: {0}")]
    Write(#[from] WriteError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PatchAction {
    Added,
    Updated,
    Deleted,
    Renamed { to: String },
}

impl fmt::Display for PatchAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Added => f.write_str("added"),
            Self::Updated => f.write_str("updated"),
            Self::Deleted => f.write_str("deleted"),
            Self::Renamed { to } => write!(f, "renamed to '{to}'"),
        }
    }
}

impl From<&ChangeRecord> for PatchAction {
    fn from(change: &ChangeRecord) -> Self {
        match change {
            ChangeRecord::Added { .. } => Self::Added,
            ChangeRecord::Updated { .. } => Self::Updated,
            ChangeRecord::Deleted { .. } => Self::Deleted,
        }
    }
}

/// Outcome of one per-locale mutation.
#[derive(Debug)]
pub struct PatchReport {
    pub key: String,
    pub locale: Locale,
    pub path: PathBuf,
    pub action: PatchAction,
    pub result: Result<(), PatchError>,
    /// Backup written before the catalog was replaced.
    pub backup: Option<PathBuf>,
}

impl PatchReport {
    pub(crate) fn new(
        key: &str,
        locale: Locale,
        path: PathBuf,
        action: PatchAction,
        outcome: Result<Option<PathBuf>, PatchError>,
    ) -> Self {
        let (result, backup) = match outcome {
            Ok(backup) => (Ok(()), backup),
            Err(err) => (Err(err), None),
        };
        Self {
            key: key.to_string(),
            locale,
            path,
            action,
            result,
            backup,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

impl fmt::Display for PatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.result {
            Ok(()) => {
                write!(
                    f,
                    "{} '{}' in {} ({})",
                    self.action,
                    self.key,
                    self.locale,
                    self.path.display()
                )?;
                match &self.backup {
                    Some(backup) => write!(f, ", backup {}", backup.display()),
                    None => Ok(()),
                }
            }
            Err(err) => write!(
                f,
                "'{}' not {} in {} ({}): {}",
                self.key,
                self.action,
                self.locale,
                self.path.display(),
                err
            ),
        }
    }
}

pub struct Patcher<'a> {
    options: &'a LiteralOptions,
    keep_backups: bool,
}

impl<'a> Patcher<'a> {
    pub fn new(options: &'a LiteralOptions, keep_backups: bool) -> Self {
        Self { options, keep_backups }
    }

    /// Apply one change for `key` to `catalog`, returning the backup path if
    /// one was written.
    pub fn apply(
        &self,
        catalog: &mut Catalog,
        key: &str,
        change: &ChangeRecord,
    ) -> Result<Option<PathBuf>, PatchError> {
        let mut entries_after = catalog.entries.clone();
        match change.new_value() {
            Some(value) => {
                entries_after.insert(key.to_string(), value.clone());
            }
            None => {
                if entries_after.shift_remove(key).is_none() {
                    log::debug!("'{}' already absent from {}", key, catalog.path.display());
                    return Ok(None);
                }
            }
        }

        let handler = get_handler(catalog.format, self.options);
        self.rewrite(catalog, entries_after, |content, after| {
            handler.apply(content, key, change, after)
        })
    }

    /// Rename `old_key` to `new_key` in `catalog`, keeping its value.
    pub fn rename(
        &self,
        catalog: &mut Catalog,
        old_key: &str,
        new_key: &str,
    ) -> Result<Option<PathBuf>, PatchError> {
        if !catalog.entries.contains_key(old_key) {
            return Err(PatchError::MissingKey(old_key.to_string()));
        }

        let entries_after: Entries = catalog
            .entries
            .iter()
            .map(|(k, v)| {
                let k = if k == old_key { new_key.to_string() } else { k.clone() };
                (k, v.clone())
            })
            .collect();

        let handler = get_handler(catalog.format, self.options);
        self.rewrite(catalog, entries_after, |content, after| {
            handler.rename(content, old_key, new_key, after)
        })
    }

    fn rewrite<F>(
        &self,
        catalog: &mut Catalog,
        entries_after: Entries,
        render: F,
    ) -> Result<Option<PathBuf>, PatchError>
    where
        F: FnOnce(&str, &Entries) -> Result<String, FormatError>,
    {
        let (content, metadata) = encoding::read_text(&catalog.path)?;
        let patched = render(&content, &entries_after)?;
        let outcome = backup_and_swap(&catalog.path, &metadata.encode(&patched), self.keep_backups)?;
        catalog.entries = entries_after;
        Ok(outcome.backup_path)
    }

    /// Apply every change to its locale's catalog, one report per change.
    ///
    /// Failures do not stop the remaining locales.
    pub fn apply_all(
        &self,
        catalogs: &mut BTreeMap<Locale, Catalog>,
        key: &str,
        changes: &[ChangeRecord],
    ) -> Vec<PatchReport> {
        changes
            .iter()
            .map(|change| {
                let locale = change.locale().to_string();
                let (path, outcome) = match catalogs.get_mut(&locale) {
                    Some(catalog) => (catalog.path.clone(), self.apply(catalog, key, change)),
                    None => (PathBuf::new(), Err(PatchError::UnknownLocale(locale.clone()))),
                };

                let report = PatchReport::new(key, locale, path, PatchAction::from(change), outcome);
                log_report(&report);
                report
            })
            .collect()
    }
}

pub(crate) fn log_report(report: &PatchReport) {
    if report.is_ok() {
        log::info!("{}", report);
    } else {
        log::error!("{}", report);
    }
}
