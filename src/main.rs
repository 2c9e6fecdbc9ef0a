mod app;
mod config;
mod controller;
mod error;
mod image_set;
mod model;
mod session;
mod view;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use crate::config::Settings;
use crate::controller::SessionController;
use crate::image_set::ImageSet;

/// Open a folder of images, draw circles on them and save marked copies.
///
/// Keys: n/p next/previous, +/- zoom, u undo, r save as, c help, Esc quit.
#[derive(Parser, Debug)]
#[command(name = "circle-tagger", version)]
struct Cli {
    /// Folder containing .jpg, .jpeg, .png, .bmp or .tiff images
    folder: PathBuf,

    /// Settings file (JSON); defaults to the user config directory
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let settings = Settings::load(cli.config.as_deref()).context("Failed to load settings")?;

    let images = ImageSet::scan(&cli.folder)?;
    log::info!("{} images in {}", images.len(), cli.folder.display());

    let controller = SessionController::new(images, settings.stroke())?;
    app::run(controller, &settings)
}
