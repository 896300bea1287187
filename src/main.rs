mod app;
mod catalog;
mod util;

use clap::Parser;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Path to a JSON catalog of collections and their sources.
    #[arg(long, default_value = "catalog.json")]
    data: String,
}

fn main() -> eframe::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();
    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1440.0, 920.0]),
        ..Default::default()
    };

    eframe::run_native(
        "source-atlas",
        options,
        Box::new(move |cc| Ok(Box::new(app::SourceAtlasApp::new(cc, args.data.clone())))),
    )
}
