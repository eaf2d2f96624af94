/// Catalog discovery and loading
use crate::config::LiteralOptions;
use crate::diff::Locale;
use crate::encoding;
use crate::formats::{get_handler, CatalogFormat, Entries, FormatError};
use crate::store::StoreError;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// One locale's catalog file and its current entries.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Catalog {
    pub locale: Locale,
    pub path: PathBuf,
    pub format: CatalogFormat,
    pub entries: Entries,
}

/// Locale tag of a catalog file: the file name up to its first `.`.
pub fn locale_of(path: &Path) -> Option<Locale> {
    let name = path.file_name()?.to_str()?;
    let stem = name.split('.').next()?;
    if stem.is_empty() {
        None
    } else {
        Some(stem.to_string())
    }
}

/// Load a single catalog file.
pub fn read_catalog(path: &Path, options: &LiteralOptions) -> Result<Catalog, StoreError> {
    let read_error = |source| StoreError::Read {
        path: path.to_path_buf(),
        source,
    };

    let format = CatalogFormat::from_path(path).ok_or_else(|| {
        read_error(FormatError::ParseError(
            "unsupported catalog extension".into(),
        ))
    })?;
    let locale = locale_of(path).ok_or_else(|| {
        read_error(FormatError::ParseError(
            "cannot derive locale from file name".into(),
        ))
    })?;

    let (content, _) = encoding::read_text(path).map_err(read_error)?;
    let entries = get_handler(format, options).read(&content).map_err(read_error)?;

    log::debug!("read {} entries for {} from {}", entries.len(), locale, path.display());

    Ok(Catalog {
        locale,
        path: path.to_path_buf(),
        format,
        entries,
    })
}

/// Load every catalog in `dir` whose file name matches `pattern`.
///
/// Any unreadable catalog aborts the whole load.
pub fn read_all(
    dir: &Path,
    pattern: &Regex,
    options: &LiteralOptions,
) -> Result<BTreeMap<Locale, Catalog>, StoreError> {
    let io_error = |source| StoreError::Io {
        path: dir.to_path_buf(),
        source,
    };

    let mut paths = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_error)? {
        let path = entry.map_err(io_error)?.path();
        if !path.is_file() {
            continue;
        }

        let matches = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|name| pattern.is_match(name));
        if !matches {
            continue;
        }
        if CatalogFormat::from_path(&path).is_none() {
            log::debug!("skipping {}: unsupported extension", path.display());
            continue;
        }
        paths.push(path);
    }
    paths.sort();

    let mut catalogs: BTreeMap<Locale, Catalog> = BTreeMap::new();
    for path in paths {
        let catalog = read_catalog(&path, options)?;
        if let Some(existing) = catalogs.get(&catalog.locale) {
            return Err(StoreError::DuplicateLocale {
                locale: catalog.locale.clone(),
                first: existing.path.clone(),
                second: catalog.path,
            });
        }
        catalogs.insert(catalog.locale.clone(), catalog);
    }

    if catalogs.is_empty() {
        log::warn!("no catalogs matching {} found in {}", pattern, dir.display());
    }

    Ok(catalogs)
}
