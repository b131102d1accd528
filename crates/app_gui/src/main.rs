mod app;

use eframe::NativeOptions;

fn main() {
    tracing_subscriber::fmt::init();
    let config = app::load_config();
    let title = format!("CAP Image Viewer {}", env!("VIEWER_VERSION"));
    let options = NativeOptions::default();
    if let Err(e) = eframe::run_native(
        &title,
        options,
        Box::new(|_cc| {
            Ok::<_, Box<dyn std::error::Error + Send + Sync>>(Box::new(app::UiApp::new(config)))
        }),
    ) {
        eprintln!("Viewer stopped with error: {e}");
    }
}
