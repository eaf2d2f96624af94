/// Catalog formats
/// Each handler reads a catalog's text into entries and produces the new
/// text of the file for one change.
pub mod json;
pub mod structured;

use crate::config::LiteralOptions;
use crate::diff::ChangeRecord;
use crate::scanners::block::BlockError;
use crate::scanners::literal::LiteralError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;
use thiserror::Error;

/// Key → value entries of one catalog, in file order.
pub type Entries = IndexMap<String, Value>;

#[derive(Debug, Error)]
pub enum FormatError {
    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Literal error: {0}")]
    Literal(#[from] LiteralError),

    #[error("Block error: {0}")]
    Block(#[from] BlockError),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("expected exactly one line matching {pattern}, found {matches}")]
    PatchMatch { pattern: String, matches: usize },

    #[error("patched catalog does not read back as expected: {0}")]
    Verification(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Encoding error: {0}")]
    EncodingError(String),
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum CatalogFormat {
    /// Object literal embedded in a TypeScript/JavaScript source file.
    StructuredLiteral,
    /// Standalone JSON object.
    FlatObject,
}

impl CatalogFormat {
    /// Detect format from file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "json" => Some(Self::FlatObject),
            "ts" | "js" | "mjs" | "cjs" => Some(Self::StructuredLiteral),
            _ => None,
        }
    }

    /// Detect format from path
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }
}

/// Format-specific reading and rewriting of a catalog's text.
pub trait CatalogHandler {
    /// Parse the catalog text into its entries.
    fn read(&self, content: &str) -> Result<Entries, FormatError>;

    /// New file text after applying `change` for `key`.
    ///
    /// `entries_after` already reflects the change; handlers that rewrite
    /// the whole file render from it, textual patchers work on `content`.
    fn apply(
        &self,
        content: &str,
        key: &str,
        change: &ChangeRecord,
        entries_after: &Entries,
    ) -> Result<String, FormatError>;

    /// New file text after renaming `old_key` to `new_key`, value untouched.
    fn rename(
        &self,
        content: &str,
        old_key: &str,
        new_key: &str,
        entries_after: &Entries,
    ) -> Result<String, FormatError>;

    fn format(&self) -> CatalogFormat;
}

/// Get the handler for a catalog format
pub fn get_handler(format: CatalogFormat, options: &LiteralOptions) -> Box<dyn CatalogHandler> {
    match format {
        CatalogFormat::FlatObject => Box::new(json::JsonHandler::new()),
        CatalogFormat::StructuredLiteral => Box::new(structured::StructuredHandler::new(options.clone())),
    }
}
