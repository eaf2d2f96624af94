//! translations - edit one translation key across every locale catalog

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use translations_core::{
    ConfigError, EditOutcome, Filter, FilterCriterion, PatchReport, StoreConfig, StoreError,
    TranslationStore,
};

const EXIT_CONFIG: i32 = -1;
const EXIT_KEY_NOT_FOUND: i32 = -2;
const EXIT_KEY_IN_USE: i32 = -3;
const EXIT_FAILURE: i32 = -4;

#[derive(Parser, Debug)]
#[command(name = "translations")]
#[command(about = "Edit one translation key across every locale catalog at once", long_about = None)]
struct Cli {
    /// Key to edit; every translation is listed when omitted
    key: Option<String>,

    /// Delete KEY from every locale
    #[arg(long, requires = "key", conflicts_with = "rename")]
    delete: bool,

    /// Rename KEY in every locale
    #[arg(long, value_name = "NEW", requires = "key")]
    rename: Option<String>,

    /// Only list translations containing TEXT
    #[arg(long, value_name = "TEXT", conflicts_with = "key")]
    filter: Option<String>,

    /// What --filter is matched against: key, locale or value
    #[arg(long, value_name = "CRITERION", requires = "filter")]
    by: Option<FilterCriterion>,

    /// Config file (YAML)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Translation directory, overrides config and environment
    #[arg(long, value_name = "DIR")]
    root: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();
    init_logging();

    let code = match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            exit_code(&err)
        }
    };
    std::process::exit(code);
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> anyhow::Result<i32> {
    let mut config = StoreConfig::load(cli.config.as_deref())?;
    config.apply_env(|name| std::env::var(name).ok());
    if let Some(root) = cli.root {
        config.root = Some(root);
    }

    let mut store = TranslationStore::open(config)?;

    let Some(key) = cli.key else {
        let filter = cli.filter.map(|text| match cli.by {
            Some(criterion) => Filter::new(criterion, text),
            None => store.default_filter(text),
        });
        list(&store, filter.as_ref());
        return Ok(0);
    };

    let reports = if cli.delete {
        store
            .delete_key(&key)
            .with_context(|| format!("cannot delete '{key}'"))?
    } else if let Some(new_key) = cli.rename.as_deref() {
        store
            .rename_key(&key, new_key)
            .with_context(|| format!("cannot rename '{key}'"))?
    } else {
        match store.open_key_in_editor(&key)? {
            EditOutcome::Unchanged => {
                println!("'{key}' unchanged");
                return Ok(0);
            }
            EditOutcome::Applied(reports) => reports,
        }
    };

    Ok(print_reports(&reports))
}

fn list(store: &TranslationStore, filter: Option<&Filter>) {
    let items = match filter {
        Some(filter) => store.filter_items(filter),
        None => store.list_all_translation_items(),
    };
    log::debug!("listing {} translation items", items.len());

    for item in items {
        println!("{}\t{}\t{}", item.key, item.locale, item.display_value());
    }
}

/// One status line per locale; any failed locale fails the run.
fn print_reports(reports: &[PatchReport]) -> i32 {
    if reports.is_empty() {
        println!("nothing to change");
    }

    let mut code = 0;
    for report in reports {
        if report.is_ok() {
            println!("✔ {report}");
        } else {
            println!("✘ {report}");
            code = EXIT_FAILURE;
        }
    }
    code
}

fn exit_code(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<StoreError>() {
        Some(StoreError::Configuration(_)) => EXIT_CONFIG,
        Some(StoreError::KeyNotFound(_)) => EXIT_KEY_NOT_FOUND,
        Some(StoreError::KeyAlreadyInUse(_)) => EXIT_KEY_IN_USE,
        Some(_) => EXIT_FAILURE,
        None if err.downcast_ref::<ConfigError>().is_some() => EXIT_CONFIG,
        None => EXIT_FAILURE,
    }
}
