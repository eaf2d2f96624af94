pub mod backup;
pub mod config;
pub mod dictionary;
pub mod diff;
pub mod editable;
pub mod editor;
pub mod encoding;
pub mod filter;
pub mod formats;
mod operations;
pub mod patcher;
pub mod reader;
pub mod scanners;
pub mod store;

pub use config::{ConfigError, LiteralOptions, StoreConfig};
pub use dictionary::{Dictionary, TranslationItem};
pub use diff::{diff, ChangeRecord, Locale, LocaleValues};
pub use editable::{EditError, EditedValues};
pub use editor::{edit_text, Editor, EditorError, ExternalEditor};
pub use filter::{Filter, FilterCriterion};
pub use formats::{CatalogFormat, Entries, FormatError};
pub use patcher::{PatchAction, PatchError, PatchReport};
pub use reader::Catalog;
pub use store::{EditOutcome, StoreError, TranslationStore};
