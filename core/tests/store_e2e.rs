//! End-to-end tests for the translation store
//!
//! Every test copies the fixture catalogs into a temporary directory, works
//! on them through the public store API and checks the files on disk.

use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tempfile::TempDir;
use translations_core::editable::{parse, resolve, serialize};
use translations_core::formats::json::{render_grouped, JsonHandler};
use translations_core::formats::CatalogHandler;
use translations_core::{
    diff, EditOutcome, EditorError, LocaleValues, StoreConfig, StoreError, TranslationStore,
};

const FIXTURE_EN: &str = include_str!("fixtures/en.json");
const FIXTURE_DE: &str = include_str!("fixtures/de.ts");
const FIXTURE_FR: &str = include_str!("fixtures/fr.json");

fn setup() -> TempDir {
    let dir = TempDir::new().expect("Failed to create temp dir");
    fs::write(dir.path().join("en.json"), FIXTURE_EN).unwrap();
    fs::write(dir.path().join("de.ts"), FIXTURE_DE).unwrap();
    fs::write(dir.path().join("fr.json"), FIXTURE_FR).unwrap();
    dir
}

fn open(dir: &Path) -> TranslationStore {
    TranslationStore::open(StoreConfig {
        root: Some(dir.to_path_buf()),
        ..StoreConfig::default()
    })
    .expect("Failed to open store")
}

/// File name → content of everything in `dir`.
fn snapshot(dir: &Path) -> BTreeMap<String, String> {
    fs::read_dir(dir)
        .unwrap()
        .map(|entry| {
            let path = entry.unwrap().path();
            let name = path.file_name().unwrap().to_string_lossy().into_owned();
            (name, fs::read_to_string(&path).unwrap())
        })
        .collect()
}

fn values(pairs: &[(&str, Value)]) -> LocaleValues {
    pairs
        .iter()
        .map(|(locale, value)| (locale.to_string(), value.clone()))
        .collect()
}

#[test]
fn test_dictionary_is_union_of_catalogs() {
    let dir = setup();
    let store = open(dir.path());

    assert_eq!(store.locales(), ["de".to_string(), "en".to_string(), "fr".to_string()]);
    assert_eq!(store.list_keys(), vec!["a.b", "greeting.hello", "limits.max", "title"]);

    let locales_of = |key: &str| store.values(key).unwrap().keys().cloned().collect::<Vec<_>>();
    assert_eq!(locales_of("title"), vec!["de", "en", "fr"]);
    assert_eq!(locales_of("a.b"), vec!["de", "en"]);
    assert_eq!(locales_of("greeting.hello"), vec!["en"]);
    assert_eq!(store.values("limits.max").unwrap()["en"], json!(10));
    assert_eq!(store.values("title").unwrap()["de"], json!("Übersetzungen"));

    assert_eq!(store.missing_locales("a.b"), vec!["fr"]);
    assert_eq!(store.list_all_translation_items().len(), 7);
}

#[test]
fn test_applied_values_read_back_for_both_formats() {
    let dir = setup();
    let mut store = open(dir.path());

    let title = values(&[("de", json!("Katalog")), ("en", json!("Catalog"))]);
    let reports = store.apply_values("title", &title);
    assert_eq!(reports.len(), 3);
    assert!(reports.iter().all(|r| r.is_ok()), "{:?}", reports);

    let limits = values(&[("de", json!(3)), ("en", json!(10))]);
    let reports = store.apply_values("limits.max", &limits);
    assert_eq!(reports.len(), 1);
    assert!(reports[0].is_ok());

    let reopened = open(dir.path());
    assert_eq!(reopened.values("title"), Some(&title));
    assert_eq!(reopened.values("limits.max"), Some(&limits));
    assert_eq!(reopened.dictionary(), store.dictionary());

    assert_eq!(fs::read_to_string(dir.path().join("fr.json")).unwrap(), "{}\n");
    assert!(fs::read_to_string(dir.path().join("de.ts"))
        .unwrap()
        .contains("    'title': 'Katalog',\n"));
}

#[test]
fn test_untouched_edit_changes_nothing() {
    let dir = setup();
    let mut store = open(dir.path());
    let before = snapshot(dir.path());

    let keys: Vec<String> = store.list_keys().into_iter().cloned().collect();
    for key in &keys {
        let old = store.values(key).cloned();
        let text = serialize(key, old.as_ref(), store.locales()).unwrap();
        let resolved = resolve(old.as_ref(), &parse(&text).unwrap(), store.locales());

        assert_eq!(Some(&resolved), old.as_ref());
        assert!(diff(old.as_ref().unwrap(), &resolved, store.locales()).is_empty());
    }

    let untouched = |_: &Path| -> Result<(), EditorError> { Ok(()) };
    let outcome = store.open_key("a.b", &untouched).unwrap();
    assert!(matches!(outcome, EditOutcome::Unchanged));

    // reformatted but equal content still writes nothing
    let reformatted = |path: &Path| -> Result<(), EditorError> {
        fs::write(path, "{\"de\": \"AB-de\", \"en\": \"AB\", \"fr\": null}").map_err(EditorError::ReadBack)
    };
    match store.open_key("a.b", &reformatted).unwrap() {
        EditOutcome::Applied(reports) => assert!(reports.is_empty()),
        EditOutcome::Unchanged => panic!("reformatted text should be parsed"),
    }

    assert_eq!(snapshot(dir.path()), before);
}

#[test]
fn test_delete_missing_key_writes_nothing() {
    let dir = setup();
    let mut store = open(dir.path());
    let before = snapshot(dir.path());

    let err = store.delete_key("does.not.exist").unwrap_err();
    assert!(matches!(err, StoreError::KeyNotFound(ref key) if key == "does.not.exist"));
    assert_eq!(snapshot(dir.path()), before);
}

#[test]
fn test_rename_to_used_key_writes_nothing() {
    let dir = setup();
    let mut store = open(dir.path());
    let before = snapshot(dir.path());

    let err = store.rename_key("a.b", "title").unwrap_err();
    assert!(matches!(err, StoreError::KeyAlreadyInUse(ref key) if key == "title"));
    assert_eq!(snapshot(dir.path()), before);
    assert_eq!(store.values("a.b").unwrap().len(), 2);
}

#[test]
fn test_adding_locale_patches_only_that_file() {
    let dir = setup();
    let mut store = open(dir.path());

    let editor = |path: &Path| -> Result<(), EditorError> {
        let current = fs::read_to_string(path).map_err(EditorError::ReadBack)?;
        fs::write(path, current.replacen("\"de\": null", "\"de\": \"Hallo\"", 1)).map_err(EditorError::ReadBack)
    };
    let reports = match store.open_key("greeting.hello", &editor).unwrap() {
        EditOutcome::Applied(reports) => reports,
        EditOutcome::Unchanged => panic!("edit was not detected"),
    };

    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].locale, "de");
    assert_eq!(reports[0].to_string(), format!("added 'greeting.hello' in de ({})", dir.path().join("de.ts").display()));

    assert_eq!(
        fs::read_to_string(dir.path().join("de.ts")).unwrap(),
        "// German messages\nexport default {\n    'greeting.hello': 'Hallo',\n    'a.b': 'AB-de',\n    'title': 'Übersetzungen',\n};\n"
    );
    assert_eq!(fs::read_to_string(dir.path().join("en.json")).unwrap(), FIXTURE_EN);
    assert_eq!(fs::read_to_string(dir.path().join("fr.json")).unwrap(), FIXTURE_FR);

    assert_eq!(
        store.values("greeting.hello"),
        Some(&values(&[("de", json!("Hallo")), ("en", json!("Hi"))]))
    );
}

#[test]
fn test_delete_key_from_all_locales() {
    let dir = setup();
    let mut store = open(dir.path());

    let reports = store.delete_key("a.b").unwrap();
    assert_eq!(reports.len(), 2);
    assert!(reports.iter().all(|r| r.is_ok()));
    assert!(store.values("a.b").is_none());

    assert_eq!(
        fs::read_to_string(dir.path().join("en.json")).unwrap(),
        "{\n    \"title\": \"Translations\",\n\n    \"greeting.hello\": \"Hi\",\n\n    \"limits.max\": 10\n}\n"
    );
    assert_eq!(
        fs::read_to_string(dir.path().join("de.ts")).unwrap(),
        "// German messages\nexport default {\n\n    'title': 'Übersetzungen',\n};\n"
    );
    assert!(open(dir.path()).values("a.b").is_none());
}

#[test]
fn test_rename_key_keeps_values() {
    let dir = setup();
    let mut store = open(dir.path());

    let reports = store.rename_key("title", "page.title").unwrap();
    assert_eq!(reports.len(), 3);
    assert!(reports.iter().all(|r| r.is_ok()));

    let reopened = open(dir.path());
    assert!(reopened.values("title").is_none());
    assert_eq!(
        reopened.values("page.title"),
        Some(&values(&[
            ("de", json!("Übersetzungen")),
            ("en", json!("Translations")),
            ("fr", json!("Traductions")),
        ]))
    );
}

#[test]
fn test_flat_object_grouping_is_stable() {
    let handler = JsonHandler::new();
    let entries = handler.read("{\"x.a\":\"1\",\"x.b\":\"2\",\"y\":\"3\"}").unwrap();

    let first = render_grouped(&entries).unwrap();
    assert_eq!(first, "{\n    \"y\": \"3\",\n\n    \"x.a\": \"1\",\n    \"x.b\": \"2\"\n}\n");

    let second = render_grouped(&handler.read(&first).unwrap()).unwrap();
    assert_eq!(second, first);

    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("xx.json"), &first).unwrap();
    let mut store = open(dir.path());
    store.apply_values("y", &values(&[("xx", json!("changed"))]));
    store.apply_values("y", &values(&[("xx", json!("3"))]));
    assert_eq!(fs::read_to_string(dir.path().join("xx.json")).unwrap(), first);
}

#[test]
fn test_backups_are_kept_when_configured() {
    let dir = setup();
    let mut store = TranslationStore::open(StoreConfig {
        root: Some(dir.path().to_path_buf()),
        keep_backups: true,
        ..StoreConfig::default()
    })
    .unwrap();

    let reports = store.delete_key("a.b").unwrap();
    assert!(reports.iter().all(|r| r.is_ok()));

    let names: Vec<String> = snapshot(dir.path()).into_keys().collect();
    assert!(names.iter().any(|n| n.starts_with("en.json.bak.")));
    assert!(names.iter().any(|n| n.starts_with("de.ts.bak.")));

    // backups do not match the catalog pattern
    assert_eq!(open(dir.path()).locales().len(), 3);
}
