//! Application entry point for the robot parade viewer.
//!
//! This binary sets up logging and eframe/egui and delegates all
//! interactive logic and rendering to [`Viewer`] from the `viewer` module.

mod viewer;

use viewer::Viewer;

/// Starts the native eframe application.
///
/// Logging goes through `env_logger`; set `RUST_LOG=robo_core=debug` to see
/// spawns and retirements.
///
/// ### Returns
/// - `Ok(())` if the application runs to completion without errors.
/// - `Err` if eframe fails to create the window or the parade settings are
///   invalid.
fn main() -> eframe::Result<()> {
    env_logger::init();
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([1000.0, 1000.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Robo Parade",
        options,
        Box::new(|_cc| Ok(Box::new(Viewer::new()?))),
    )
}
