use crate::location::StampLocation;
use crate::stamp_image::{parse_quality, Quality};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "pdfstamp",
    about = "Stamp a clickable image onto pages of PDF files"
)]
pub struct Args {
    /// Legacy page number, parsed but ignored (the page comes from each -l)
    #[arg(short = 'p', long = "page", default_value_t = 1)]
    pub page: i32,

    /// Location on page to apply stamp, as PAGE,X,Y (repeatable)
    #[arg(
        short = 'l',
        long = "location",
        value_name = "PAGE,X,Y",
        required = true,
        allow_hyphen_values = true
    )]
    pub locations: Vec<StampLocation>,

    /// Descend recursively into directories
    #[arg(short = 'r', long)]
    pub recursive: bool,

    /// Target URL of the stamp
    #[arg(short = 'u', long, default_value = "")]
    pub url: String,

    /// Image file containing the stamp (PNG or JPG)
    #[arg(short = 'i', long = "image", value_name = "PATH")]
    pub image: PathBuf,

    /// Output directory (default: next to each input)
    #[arg(short = 'd', long = "output-dir", value_name = "PATH")]
    pub output_dir: Option<PathBuf>,

    /// Image embedding: "lossless" or 1-100 (JPEG)
    #[arg(short = 'q', long, default_value = "lossless", value_parser = parse_quality)]
    pub quality: Quality,

    /// Debug logging when RUST_LOG is not set
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// PDF files and/or directories to stamp
    pub paths: Vec<PathBuf>,
}

/// Resolved options for one run. Built once, read-only afterwards.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub legacy_page: i32,
    pub locations: Vec<StampLocation>,
    pub recursive: bool,
    pub url: String,
    pub image: PathBuf,
    pub output_dir: Option<PathBuf>,
    pub quality: Quality,
    pub paths: Vec<PathBuf>,
}

impl From<Args> for RunConfig {
    fn from(args: Args) -> Self {
        Self {
            legacy_page: args.page,
            locations: args.locations,
            recursive: args.recursive,
            url: args.url,
            image: args.image,
            output_dir: args.output_dir,
            quality: args.quality,
            paths: args.paths,
        }
    }
}
