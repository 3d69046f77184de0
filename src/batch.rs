use crate::cli::RunConfig;
use crate::error::StampError;
use crate::location::StampLocation;
use crate::resolve::{self, Target};
use crate::stamp_image::StampImage;
use crate::stamper;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Everything a stamping call needs besides the file pair.
#[derive(Debug, Clone)]
pub struct StampContext {
    pub image: StampImage,
    pub url: String,
    pub locations: Vec<StampLocation>,
}

impl StampContext {
    pub fn new(image: StampImage, config: &RunConfig) -> Self {
        Self {
            image,
            url: config.url.clone(),
            locations: config.locations.clone(),
        }
    }
}

#[derive(Debug)]
pub struct Failure {
    pub input: PathBuf,
    pub error: StampError,
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub stamped: Vec<Target>,
    pub failures: Vec<Failure>,
}

/// Stamps every file reachable from `paths`, one at a time. A failing file
/// is reported on stderr and the run continues with the next one.
pub fn run(
    ctx: &StampContext,
    paths: &[PathBuf],
    recursive: bool,
    output_dir: Option<&Path>,
) -> BatchReport {
    let mut report = BatchReport::default();

    for path in paths {
        for resolved in resolve::resolve(path, recursive, output_dir) {
            let target = match resolved {
                Ok(target) => target,
                Err(error) => {
                    let input = match &error {
                        StampError::ListDir { path: dir, .. } => dir.clone(),
                        _ => path.clone(),
                    };
                    report.fail(input, error);
                    continue;
                }
            };

            debug!(input = %target.input.display(), output = %target.output.display(), "stamping");
            match stamper::stamp_file(
                &target.input,
                &target.output,
                &ctx.image,
                &ctx.url,
                &ctx.locations,
            ) {
                Ok(()) => {
                    info!(output = %target.output.display(), "stamped");
                    report.stamped.push(target);
                }
                Err(error) => report.fail(target.input, error),
            }
        }
    }

    report
}

impl BatchReport {
    fn fail(&mut self, input: PathBuf, error: StampError) {
        print_failure(&input, &error);
        self.failures.push(Failure { input, error });
    }
}

fn print_failure(input: &Path, error: &StampError) {
    let marker = if std::io::stderr().is_terminal() {
        "\x1b[31m!!\x1b[0m"
    } else {
        "!!"
    };
    eprintln!("{marker} Failed on {} because of: {error}", input.display());
}
