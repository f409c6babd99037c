//! # Garden Designer
//!
//! Opens the designer window.
//!
//! ## Usage:
//! ```bash
//! cargo run --release -- [config.json] [save.json]
//! ```
//!
//! - Pick an item in the Garden Tools panel and click the lawn to place it
//! - Ctrl+Z undoes, Ctrl+S saves and Ctrl+L loads the garden
//! - Esc quits

use std::path::PathBuf;

use garden_designer::app::GardenApp;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args_os().skip(1).map(PathBuf::from);
    let config_path = args.next();
    let mut app = GardenApp::new(config_path);
    if let Some(save_path) = args.next() {
        app = app.with_save_path(save_path);
    }
    app.run()
}
