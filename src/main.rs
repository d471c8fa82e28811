use anyhow::{Context, Result};
use clap::Parser;
use tablegen::cli::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.log_level_filter())
        .parse_default_env()
        .format_timestamp(None)
        .format_target(false)
        .init();

    let config = cli.resolve_config().context("Failed to load configuration")?;
    log::debug!("Running with {config:?}");

    let summary = tablegen::pipeline::run(&config).map_err(|err| {
        let context = if err.is_source_error() {
            "Fix the table declaration and rerun; that module and its CSV files were not written"
                .to_string()
        } else {
            format!(
                "Failed to externalize tables in {}",
                config.input_dir.display()
            )
        };
        anyhow::Error::new(err).context(context)
    })?;

    if summary.modules_rewritten.is_empty() {
        log::info!("Nothing to externalize");
    }
    Ok(())
}
