mod panels;

use anyhow::{Context, Result};
use eframe::{App, Frame, egui};
use review_core::{AutosaveStatus, ReviewConfig, ReviewSession};
use rfd::FileDialog;
use std::path::{Path, PathBuf};
use std::time::Instant;

const CONFIG_FILE: &str = "review.toml";

/// Config from `./review.toml`, then the platform config dir, else defaults.
pub fn load_config() -> ReviewConfig {
    let mut candidates = vec![PathBuf::from(CONFIG_FILE)];
    if let Some(dirs) = directories_next::ProjectDirs::from("edu", "cap", "ViewLabeler") {
        candidates.push(dirs.config_dir().join(CONFIG_FILE));
    }
    for path in candidates {
        if !path.exists() {
            continue;
        }
        match ReviewConfig::from_file(&path) {
            Ok(cfg) => {
                tracing::info!("Using config {}", path.display());
                return cfg;
            }
            Err(e) => tracing::warn!("Ignoring config: {e}"),
        }
    }
    ReviewConfig::default()
}

/// Presentation shell. All review state lives in the session.
pub struct UiApp {
    config: ReviewConfig,
    session: Option<ReviewSession>,
    predictions_path: Option<PathBuf>,
    textures: Vec<egui::TextureHandle>,
    textures_for: Option<(String, usize)>,
    status: String,
}

impl UiApp {
    pub fn new(config: ReviewConfig) -> Self {
        Self {
            config,
            session: None,
            predictions_path: None,
            textures: Vec::new(),
            textures_for: None,
            status: String::new(),
        }
    }

    fn pick_case(&mut self) {
        let Some(dir) = FileDialog::new()
            .set_title("Select Patient Directory")
            .set_directory(".")
            .pick_folder()
        else {
            return;
        };
        if let Err(e) = self.open_case(&dir) {
            self.status = format!("{e:#}");
        }
    }

    fn open_case(&mut self, dir: &Path) -> Result<()> {
        let mut session = ReviewSession::open(dir, self.config.clone())
            .with_context(|| format!("Could not open {}", dir.display()))?;
        if self.predictions_path.is_none() {
            self.predictions_path = FileDialog::new()
                .set_title("Select Predictions File")
                .add_filter("CSV", &["csv"])
                .set_directory(".")
                .pick_file();
        }
        if let Some(path) = &self.predictions_path {
            session.select_predictions(path);
        }
        self.status = format!(
            "Opened {} ({} series, {} saved labels)",
            session.patient_id(),
            session.navigator().len(),
            session.annotations().len()
        );
        self.session = Some(session);
        self.textures_for = None;
        Ok(())
    }

    fn pick_predictions(&mut self) {
        let Some(path) = FileDialog::new()
            .set_title("Select Predictions File")
            .add_filter("CSV", &["csv"])
            .set_directory(".")
            .pick_file()
        else {
            return;
        };
        if let Some(session) = self.session.as_mut() {
            let count = session.select_predictions(&path);
            self.status = format!("{count} predictions loaded");
        }
        self.predictions_path = Some(path);
    }

    fn save(&mut self) {
        let Some(session) = self.session.as_ref() else {
            return;
        };
        self.status = match session.save() {
            Ok(path) => format!("Labels saved: {}", path.display()),
            Err(e) => format!("Save failed: {e}"),
        };
    }

    fn navigate(&mut self, forward: bool) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let result = if forward {
            session.forward()
        } else {
            session.back()
        };
        if let Err(e) = result {
            self.status = e.to_string();
        }
    }

    fn label(&mut self, label: Option<&str>) {
        let advance = self.config.advance_after_label;
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let outcome = match (label, advance) {
            (Some(label), true) => session
                .assign_and_advance(label)
                .map(|s| s.outcome)
                .map_err(anyhow::Error::from),
            (Some(label), false) => Ok(session.assign_label(label)),
            (None, true) => session
                .accept_prediction_and_advance()
                .map(|s| s.outcome)
                .map_err(anyhow::Error::from),
            (None, false) => session.accept_prediction().map_err(anyhow::Error::from),
        };
        self.status = match outcome {
            Ok(outcome) => match outcome.autosave {
                AutosaveStatus::Saved(path) => format!("Autosaved to {}", path.display()),
                AutosaveStatus::Failed(e) => format!("Autosave failed: {e}"),
                AutosaveStatus::NotDue => format!("{:?}", outcome.change),
            },
            Err(e) => format!("{e:#}"),
        };
    }

    fn toggle_cine(&mut self) {
        if let Some(session) = self.session.as_mut() {
            if session.cine().is_playing() {
                session.stop();
            } else {
                session.play(Instant::now());
            }
        }
    }

    /// Rebuild textures when the current series changed.
    fn sync_textures(&mut self, ctx: &egui::Context) {
        let Some(session) = self.session.as_ref() else {
            self.textures.clear();
            return;
        };
        let key = (session.patient_id().to_string(), session.navigator().position());
        if self.textures_for.as_ref() == Some(&key) {
            return;
        }
        self.textures = session
            .current_series()
            .frames
            .iter()
            .map(|frame| {
                let (w, h) = frame.image.dimensions();
                let color =
                    egui::ColorImage::from_gray([w as usize, h as usize], frame.image.as_raw());
                ctx.load_texture(
                    format!("frame:{}", frame.file_id),
                    color,
                    egui::TextureOptions::LINEAR,
                )
            })
            .collect();
        self.textures_for = Some(key);
    }

    fn handle_keys(&mut self, ctx: &egui::Context) {
        let (left, right, space) = ctx.input(|i| {
            (
                i.key_pressed(egui::Key::ArrowLeft),
                i.key_pressed(egui::Key::ArrowRight),
                i.key_pressed(egui::Key::Space),
            )
        });
        if left {
            self.navigate(false);
        }
        if right {
            self.navigate(true);
        }
        if space {
            self.toggle_cine();
        }
    }
}

impl App for UiApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut Frame) {
        self.handle_keys(ctx);

        if let Some(session) = self.session.as_mut() {
            let now = Instant::now();
            session.poll_cine(now);
            if let Some(due) = session.cine().next_due() {
                ctx.request_repaint_after(due.saturating_duration_since(now));
            }
        }
        self.sync_textures(ctx);

        self.render_top_bar(ctx);
        if self.session.is_some() {
            self.render_info_panel(ctx);
            self.render_label_panel(ctx);
            self.render_nav_bar(ctx);
        }
        self.render_viewer(ctx);
    }
}
