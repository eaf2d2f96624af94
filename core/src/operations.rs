/// Whole-key operations across every locale
///
/// Each locale's catalog is patched on its own. A failure in one locale does
/// not undo the locales already patched; the reports show which ones
/// succeeded.
use crate::diff::{ChangeRecord, Locale};
use crate::patcher::{log_report, PatchAction, PatchError, PatchReport};
use crate::store::{validate_key, StoreError, TranslationStore};
use std::path::PathBuf;

impl TranslationStore {
    /// Remove `key` from every catalog that defines it.
    pub fn delete_key(&mut self, key: &str) -> Result<Vec<PatchReport>, StoreError> {
        let values = self
            .values(key)
            .cloned()
            .ok_or_else(|| StoreError::KeyNotFound(key.to_string()))?;

        let changes: Vec<ChangeRecord> = values
            .into_iter()
            .map(|(locale, old_value)| ChangeRecord::Deleted { locale, old_value })
            .collect();

        let (patcher, catalogs) = self.patcher_parts();
        let reports = patcher.apply_all(catalogs, key, &changes);
        self.rebuild();
        Ok(reports)
    }

    /// Rename `old_key` to `new_key` in every catalog that defines it,
    /// keeping each locale's value.
    pub fn rename_key(&mut self, old_key: &str, new_key: &str) -> Result<Vec<PatchReport>, StoreError> {
        validate_key(new_key)?;
        let locales: Vec<Locale> = self
            .values(old_key)
            .ok_or_else(|| StoreError::KeyNotFound(old_key.to_string()))?
            .keys()
            .cloned()
            .collect();
        if self.dictionary().contains_key(new_key) {
            return Err(StoreError::KeyAlreadyInUse(new_key.to_string()));
        }

        let (patcher, catalogs) = self.patcher_parts();
        let mut reports = Vec::with_capacity(locales.len());
        for locale in locales {
            let (path, outcome) = match catalogs.get_mut(&locale) {
                Some(catalog) => (catalog.path.clone(), patcher.rename(catalog, old_key, new_key)),
                None => (PathBuf::new(), Err(PatchError::UnknownLocale(locale.clone()))),
            };

            let action = PatchAction::Renamed {
                to: new_key.to_string(),
            };
            let report = PatchReport::new(old_key, locale, path, action, outcome);
            log_report(&report);
            reports.push(report);
        }

        self.rebuild();
        Ok(reports)
    }
}
