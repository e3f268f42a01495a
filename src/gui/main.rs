// GUI entry point for grid-converter
// Launched bare it opens the window; with arguments it behaves like the CLI.

use clap::Parser;
use eframe::egui;
use std::ffi::OsString;

use grid_converter::cli::Args;
use grid_converter::{commands, select_front_end, FrontEnd};

mod app;
use app::GridConverterApp;

fn main() -> anyhow::Result<()> {
    let argv: Vec<OsString> = std::env::args_os().collect();

    match select_front_end(&argv, true) {
        FrontEnd::CommandLine => commands::run(Args::parse_from(argv)),
        FrontEnd::Interactive => {
            let options = eframe::NativeOptions {
                viewport: egui::ViewportBuilder::default()
                    .with_inner_size([520.0, 420.0])
                    .with_min_inner_size([420.0, 320.0]),
                ..Default::default()
            };

            eframe::run_native(
                "Grid Converter",
                options,
                Box::new(|cc| Ok(Box::new(GridConverterApp::new(cc)))),
            )
            .map_err(|e| anyhow::anyhow!("Failed to start the GUI: {}", e))
        }
    }
}
