//! CI relationship graph
//!
//! A native viewer for CMDB configuration items and the relationships between them.

mod app;
mod graph;
mod loader;
mod settings;
mod theme;

use std::path::PathBuf;

use anyhow::anyhow;
use clap::Parser;
use eframe::egui;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Graph document (JSON with `nodes` and `relationships`); the built-in sample when omitted
    #[arg(long, value_name = "PATH")]
    data: Option<PathBuf>,

    /// Start with the minimap hidden
    #[arg(long)]
    no_minimap: bool,
}

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let data = loader::load_graph_data(args.data.as_deref())?;

    let mut settings = settings::Settings::load();
    if args.no_minimap {
        settings.show_minimap = false;
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_title("CI Relationships"),
        persist_window: true,
        ..Default::default()
    };

    eframe::run_native(
        "CI Relationships",
        options,
        Box::new(move |cc| Ok(Box::new(app::GraphApp::new(cc, data, settings)))),
    )
    .map_err(|e| anyhow!("failed to run the graph window: {e}"))
}
