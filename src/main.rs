use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;

use indicator_formula::config::FormulaConfig;
use indicator_formula::messages::Msg;
use indicator_formula::model::FormulaModel;
use indicator_formula::runtime::Runtime;
use indicator_formula::source::Catalog;

mod cli;

use cli::{parse_script, CliArgs, Step};

/// Upper bound on waiting for candidate sources after each keystroke
const SETTLE_TIMEOUT: Duration = Duration::from_secs(5);

fn main() -> Result<()> {
    let args = CliArgs::parse();
    indicator_formula::tracing::init();

    let config = match &args.config {
        Some(path) => FormulaConfig::load_from(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => FormulaConfig::load(),
    };

    let catalog = match &args.catalog {
        Some(path) => Catalog::load(path)?,
        None => default_catalog(),
    };

    let steps = parse_script(&args.keys).context("Invalid key script")?;

    let model = match &args.value {
        Some(value) => FormulaModel::from_serialized(value, config)
            .context("Failed to load initial value")?,
        None => FormulaModel::new(config),
    };

    let mut runtime = Runtime::new(model, catalog.into_registry());
    for step in steps {
        match step {
            Step::Key(key) => runtime.handle_key(key),
            Step::Toolbar(button) => runtime.dispatch(Msg::Toolbar(button)),
        };
        if !runtime.wait_idle(SETTLE_TIMEOUT) {
            tracing::warn!("Continuing with candidate requests outstanding");
        }
    }

    if args.json {
        let nodes = serde_json::to_string_pretty(runtime.model().document.nodes())?;
        println!("{}", nodes);
    } else {
        println!("{}", runtime.value());
    }
    Ok(())
}

/// The user's catalog file if present, otherwise the built-in sample data
fn default_catalog() -> Catalog {
    let Some(path) = indicator_formula::config_paths::catalog_file() else {
        return Catalog::demo();
    };
    if !path.exists() {
        return Catalog::demo();
    }
    match Catalog::load(&path) {
        Ok(catalog) => catalog,
        Err(e) => {
            tracing::warn!("Ignoring catalog at {}: {:#}", path.display(), e);
            Catalog::demo()
        }
    }
}
