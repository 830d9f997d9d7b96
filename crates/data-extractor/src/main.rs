mod bootstrap;

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Parser;
use extractor_core::settings::Settings;
use extractor_data::engine::{process_files, ProcessOptions};
use extractor_data::progress::{CancelFlag, ProgressEvent};
use extractor_data::reader::resolve_inputs;
use extractor_data::writer::{render_table, write_summary};

fn main() -> Result<()> {
    let settings = Settings::parse();

    bootstrap::setup_logging(settings.effective_log_level())?;
    tracing::info!("Data Extractor v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "Connector: {}, inputs: {}",
        settings.connector,
        settings.inputs.len()
    );

    let paths = resolve_inputs(&settings.inputs)?;

    let cancel = CancelFlag::new();
    bootstrap::install_cancel_handler(&cancel)?;

    let options = ProcessOptions {
        connector: settings.connector,
        model_names: settings.model_names,
    };
    let mut sink = |event: &ProgressEvent| println!("{}", event);
    let table = process_files(&paths, &options, &mut sink, &cancel);

    // A cancelled run has no partial-output contract.
    if table.cancelled {
        bail!("Run cancelled; no summary written");
    }
    if table.is_empty() {
        bail!(
            "None of the {} input file(s) produced a summary; nothing written",
            paths.len()
        );
    }

    println!();
    for line in render_table(&table) {
        println!("{}", line);
    }
    println!();

    let output = settings.output_path(paths.first().map(PathBuf::as_path));
    write_summary(&table, &output)?;
    println!("Summary saved to {}", output.display());

    Ok(())
}
