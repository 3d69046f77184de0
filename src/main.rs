use anyhow::Result;
use clap::Parser;
use pdfstamp::batch::{self, StampContext};
use pdfstamp::cli::{Args, RunConfig};
use pdfstamp::stamp_image;
use std::process::ExitCode;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<ExitCode> {
    let args = Args::parse();
    init_logging(args.verbose);

    let config = RunConfig::from(args);
    if config.legacy_page != 1 {
        warn!(page = config.legacy_page, "-p is ignored; pages come from -l");
    }

    let image = match stamp_image::load(&config.image, config.quality) {
        Ok(image) => image,
        Err(e) => {
            eprintln!("Couldn't open image file because of: {e:#}");
            return Ok(ExitCode::FAILURE);
        }
    };

    if let Some(dir) = &config.output_dir {
        if let Err(e) = std::fs::create_dir_all(dir) {
            warn!(dir = %dir.display(), error = %e, "cannot create output directory");
        }
    }

    let ctx = StampContext::new(image, &config);
    let report = batch::run(
        &ctx,
        &config.paths,
        config.recursive,
        config.output_dir.as_deref(),
    );

    info!(
        stamped = report.stamped.len(),
        failed = report.failures.len(),
        "done"
    );
    Ok(ExitCode::SUCCESS)
}

fn init_logging(verbose: bool) {
    let default = if verbose { "pdfstamp=debug" } else { "pdfstamp=warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
