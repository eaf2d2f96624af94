/// Translation store: catalogs, their merged dictionary and the edit path
use crate::config::{ConfigError, StoreConfig};
use crate::dictionary::{Dictionary, TranslationItem};
use crate::diff::{diff, Locale, LocaleValues};
use crate::editable::{self, EditError, EditedValues};
use crate::editor::{edit_text, Editor, EditorError, ExternalEditor};
use crate::filter::Filter;
use crate::formats::FormatError;
use crate::patcher::{PatchReport, Patcher};
use crate::reader::{read_all, Catalog};
use std::collections::BTreeMap;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigError),

    #[error("failed to read catalog {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: FormatError,
    },

    #[error("locale '{locale}' is defined by both {} and {}", .first.display(), .second.display())]
    DuplicateLocale {
        locale: Locale,
        first: PathBuf,
        second: PathBuf,
    },

    #[error("failed to access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("key '{0}' not found")]
    KeyNotFound(String),

    #[error("key '{0}' is already in use")]
    KeyAlreadyInUse(String),

    #[error("invalid key '{0}'")]
    InvalidKey(String),

    #[error("editor failed: {0}")]
    Editor(#[from] EditorError),

    #[error(transparent)]
    EditedContent(#[from] EditError),
}

/// Result of an edit round trip.
#[derive(Debug)]
pub enum EditOutcome {
    /// The text came back untouched; nothing was written.
    Unchanged,
    /// One report per locale that had to change.
    Applied(Vec<PatchReport>),
}

pub struct TranslationStore {
    config: StoreConfig,
    catalogs: BTreeMap<Locale, Catalog>,
    locales: Vec<Locale>,
    dictionary: Dictionary,
}

impl TranslationStore {
    /// Validate `config` and load every catalog under its root.
    pub fn open(config: StoreConfig) -> Result<Self, StoreError> {
        config.validate()?;
        let root = config.root()?.to_path_buf();
        let catalogs = read_all(&root, &config.file_regex()?, &config.literal)?;

        log::info!("loaded {} catalogs from {}", catalogs.len(), root.display());
        Ok(Self::from_catalogs(config, catalogs))
    }

    pub fn from_catalogs(config: StoreConfig, catalogs: BTreeMap<Locale, Catalog>) -> Self {
        let locales = catalogs.keys().cloned().collect();
        let dictionary = Dictionary::build(&catalogs);
        Self {
            config,
            catalogs,
            locales,
            dictionary,
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// All locales, sorted.
    pub fn locales(&self) -> &[Locale] {
        &self.locales
    }

    pub fn catalogs(&self) -> &BTreeMap<Locale, Catalog> {
        &self.catalogs
    }

    pub fn dictionary(&self) -> &Dictionary {
        &self.dictionary
    }

    pub fn values(&self, key: &str) -> Option<&LocaleValues> {
        self.dictionary.get(key)
    }

    pub fn list_keys(&self) -> Vec<&String> {
        self.dictionary.keys().collect()
    }

    pub fn list_all_translation_items(&self) -> Vec<TranslationItem> {
        self.dictionary.items()
    }

    pub fn filter_items(&self, filter: &Filter) -> Vec<TranslationItem> {
        self.dictionary
            .items()
            .into_iter()
            .filter(|item| filter.matches(item))
            .collect()
    }

    /// Filter on the configured default criterion.
    pub fn default_filter(&self, pattern: impl Into<String>) -> Filter {
        Filter::new(self.config.default_filter, pattern)
    }

    pub fn missing_locales(&self, key: &str) -> Vec<&Locale> {
        self.dictionary.missing_locales(key, &self.locales)
    }

    /// Editable text for `key`; unknown keys list every locale as null.
    pub fn editable_content(&self, key: &str) -> Result<String, StoreError> {
        validate_key(key)?;
        Ok(editable::serialize(key, self.values(key), &self.locales)?)
    }

    /// Edit `key` in the configured external editor.
    pub fn open_key_in_editor(&mut self, key: &str) -> Result<EditOutcome, StoreError> {
        let (program, args) = self.config.editor_command()?;
        let editor = ExternalEditor::new(program, args);
        self.open_key(key, &editor)
    }

    /// Round-trip `key` through `editor` and apply whatever changed.
    pub fn open_key(&mut self, key: &str, editor: &dyn Editor) -> Result<EditOutcome, StoreError> {
        let original = self.editable_content(key)?;
        let edited = edit_text(editor, &original)?;

        if edited.trim() == original.trim() {
            log::debug!("'{}' left unchanged", key);
            return Ok(EditOutcome::Unchanged);
        }

        let values = editable::parse(&edited)?;
        Ok(EditOutcome::Applied(self.apply_edit(key, &values)?))
    }

    /// Apply parsed editor output for `key`.
    pub fn apply_edit(&mut self, key: &str, edited: &EditedValues) -> Result<Vec<PatchReport>, StoreError> {
        validate_key(key)?;
        let resolved = editable::resolve(self.values(key), edited, &self.locales);
        Ok(self.apply_values(key, &resolved))
    }

    /// Bring every catalog in line with `new` for `key`.
    pub fn apply_values(&mut self, key: &str, new: &LocaleValues) -> Vec<PatchReport> {
        let old = self.values(key).cloned().unwrap_or_default();
        let changes = diff(&old, new, &self.locales);
        if changes.is_empty() {
            return Vec::new();
        }

        let patcher = Patcher::new(&self.config.literal, self.config.keep_backups);
        let reports = patcher.apply_all(&mut self.catalogs, key, &changes);
        self.rebuild();
        reports
    }

    pub(crate) fn patcher_parts(&mut self) -> (Patcher<'_>, &mut BTreeMap<Locale, Catalog>) {
        (
            Patcher::new(&self.config.literal, self.config.keep_backups),
            &mut self.catalogs,
        )
    }

    /// The dictionary is always rebuilt whole from the catalogs.
    pub(crate) fn rebuild(&mut self) {
        self.dictionary = Dictionary::build(&self.catalogs);
    }
}

pub(crate) fn validate_key(key: &str) -> Result<(), StoreError> {
    if key.trim().is_empty() || key.contains('\n') {
        return Err(StoreError::InvalidKey(key.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::FilterCriterion;
    use serde_json::json;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn store(dir: &TempDir) -> TranslationStore {
        fs::write(
            dir.path().join("en.ts"),
            "export const en = {\n    'greeting.hello': 'Hi',\n    'a.b': 'B',\n};\n",
        )
        .unwrap();
        fs::write(dir.path().join("de.json"), "{\n    \"a.b\": \"B-de\"\n}\n").unwrap();

        TranslationStore::open(StoreConfig {
            root: Some(dir.path().to_path_buf()),
            ..StoreConfig::default()
        })
        .unwrap()
    }

    fn scripted(text: &'static str) -> impl Fn(&Path) -> Result<(), EditorError> {
        move |path: &Path| fs::write(path, text).map_err(EditorError::ReadBack)
    }

    #[test]
    fn exposes_read_model() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);

        assert_eq!(store.locales(), ["de".to_string(), "en".to_string()]);
        assert_eq!(store.list_keys(), vec!["a.b", "greeting.hello"]);
        assert_eq!(store.list_all_translation_items().len(), 3);
        assert_eq!(store.missing_locales("greeting.hello"), vec!["de"]);

        let filtered = store.filter_items(&Filter::new(FilterCriterion::Locale, "de"));
        assert_eq!(filtered.len(), 1);
        assert_eq!(store.default_filter("hello").criterion, FilterCriterion::Key);
        assert_eq!(store.filter_items(&store.default_filter("hello")).len(), 1);
    }

    #[test]
    fn untouched_edit_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let mut store = store(&dir);
        let before = fs::read_to_string(dir.path().join("en.ts")).unwrap();

        let untouched = |_: &Path| -> Result<(), EditorError> { Ok(()) };
        let outcome = store.open_key("greeting.hello", &untouched).unwrap();
        assert!(matches!(outcome, EditOutcome::Unchanged));
        assert_eq!(fs::read_to_string(dir.path().join("en.ts")).unwrap(), before);
    }

    #[test]
    fn adding_a_locale_only_touches_that_catalog() {
        let dir = TempDir::new().unwrap();
        let mut store = store(&dir);
        let en_before = fs::read_to_string(dir.path().join("en.ts")).unwrap();

        let editor = scripted("// greeting.hello\n{\n    \"de\": \"Hallo\",\n    \"en\": \"Hi\"\n}\n");
        let outcome = store.open_key("greeting.hello", &editor).unwrap();

        let reports = match outcome {
            EditOutcome::Applied(reports) => reports,
            EditOutcome::Unchanged => panic!("edit was ignored"),
        };
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].locale, "de");
        assert!(reports[0].is_ok());

        assert_eq!(fs::read_to_string(dir.path().join("en.ts")).unwrap(), en_before);
        assert_eq!(
            fs::read_to_string(dir.path().join("de.json")).unwrap(),
            "{\n    \"a.b\": \"B-de\",\n\n    \"greeting.hello\": \"Hallo\"\n}\n"
        );
        assert_eq!(store.values("greeting.hello").unwrap().len(), 2);
    }

    #[test]
    fn malformed_edit_is_rejected_without_writes() {
        let dir = TempDir::new().unwrap();
        let mut store = store(&dir);

        let err = store.open_key("a.b", &scripted("{ \"en\": ")).unwrap_err();
        assert!(matches!(err, StoreError::EditedContent(_)));
        assert_eq!(store.values("a.b").unwrap()["en"], json!("B"));
    }

    #[test]
    fn creates_brand_new_key() {
        let dir = TempDir::new().unwrap();
        let mut store = store(&dir);

        let edited: EditedValues = [("en".to_string(), Some(json!("New"))), ("de".to_string(), None)]
            .into_iter()
            .collect();
        let reports = store.apply_edit("brand.new", &edited).unwrap();
        assert_eq!(reports.len(), 1);
        assert!(fs::read_to_string(dir.path().join("en.ts"))
            .unwrap()
            .contains("{\n    'brand.new': 'New',\n    'greeting.hello': 'Hi',"));
    }

    #[test]
    fn backtick_quote_config_writes_readable_catalogs() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("en.ts"), "export default {\n    'a': 'A',\n};\n").unwrap();
        let mut store = TranslationStore::open(StoreConfig {
            root: Some(dir.path().to_path_buf()),
            literal: crate::config::LiteralOptions {
                quote: '`',
                ..Default::default()
            },
            ..StoreConfig::default()
        })
        .unwrap();

        let added: LocaleValues = [("en".to_string(), json!("B"))].into_iter().collect();
        let reports = store.apply_values("b", &added);
        assert!(reports.iter().all(|r| r.is_ok()), "{:?}", reports);

        let updated: LocaleValues = [("en".to_string(), json!("Bee"))].into_iter().collect();
        assert!(store.apply_values("b", &updated).iter().all(|r| r.is_ok()));
        assert!(store.rename_key("b", "c").unwrap().iter().all(|r| r.is_ok()));

        assert_eq!(
            fs::read_to_string(dir.path().join("en.ts")).unwrap(),
            "export default {\n    'c': `Bee`,\n    'a': 'A',\n};\n"
        );
    }

    #[test]
    fn rejects_blank_keys_and_missing_editor() {
        let dir = TempDir::new().unwrap();
        let mut store = store(&dir);

        assert!(matches!(store.editable_content("  "), Err(StoreError::InvalidKey(_))));
        assert!(matches!(
            store.open_key_in_editor("a.b"),
            Err(StoreError::Configuration(ConfigError::MissingEditor))
        ));
    }

    #[test]
    fn missing_root_is_a_configuration_error() {
        let err = TranslationStore::open(StoreConfig::default()).err().unwrap();
        assert!(matches!(err, StoreError::Configuration(ConfigError::MissingRoot)));
    }
}
