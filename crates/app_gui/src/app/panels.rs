//! Panel layout: top bar, series info, label buttons, navigation and the frame view.

use super::UiApp;
use eframe::egui;
use review_core::ViewLabel;

const LABEL_COLOR: egui::Color32 = egui::Color32::from_rgb(200, 40, 40);

impl UiApp {
    pub(super) fn render_top_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("top").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui.button("Select Directory").clicked() {
                    self.pick_case();
                }
                if ui.button("Select Predictions File").clicked() {
                    self.pick_predictions();
                }
                if ui
                    .add_enabled(self.session.is_some(), egui::Button::new("Save Labels"))
                    .clicked()
                {
                    self.save();
                }
                if !self.status.is_empty() {
                    ui.label(&self.status);
                }
            });
            if let Some(session) = &self.session {
                ui.label(session.current_series_id());
            }
        });
    }

    pub(super) fn render_info_panel(&mut self, ctx: &egui::Context) {
        let Some(session) = &self.session else {
            return;
        };
        let display = session.display();
        let playing = session.cine().is_playing();

        let mut toggle = false;
        egui::SidePanel::left("info").show(ctx, |ui| {
            ui.heading("DICOM Info:");
            ui.label(format!(
                "Series: {} / {}",
                display.position + 1,
                display.series_count
            ));
            ui.label(format!("Number of frames: {}", display.frame_count));
            ui.label(format!("Series Description: {}", display.description));
            ui.label(format!("Pulse Sequence: {}", display.pulse_sequence));
            ui.add_space(12.0);
            ui.colored_label(
                LABEL_COLOR,
                format!("Predicted View Label: {}", display.prediction_text),
            );
            ui.colored_label(
                LABEL_COLOR,
                format!("Accepted View Label: {}", display.label_text),
            );
            ui.add_space(12.0);
            ui.horizontal(|ui| {
                let play = ui.add_enabled(!playing, egui::Button::new("play"));
                let stop = ui.add_enabled(playing, egui::Button::new("stop"));
                toggle = play.clicked() || stop.clicked();
            });
        });
        if toggle {
            self.toggle_cine();
        }
    }

    pub(super) fn render_label_panel(&mut self, ctx: &egui::Context) {
        let has_prediction = self
            .session
            .as_ref()
            .is_some_and(|s| s.current_prediction().is_some());

        let mut chosen: Option<Option<&'static str>> = None;
        egui::SidePanel::right("labels").show(ctx, |ui| {
            for label in ViewLabel::ALL {
                if ui.button(label.to_string()).clicked() {
                    chosen = Some(Some(label.key()));
                }
            }
            ui.add_space(12.0);
            if ui
                .add_enabled(has_prediction, egui::Button::new("Accept Prediction"))
                .clicked()
            {
                chosen = Some(None);
            }
        });
        if let Some(label) = chosen {
            self.label(label);
        }
    }

    pub(super) fn render_nav_bar(&mut self, ctx: &egui::Context) {
        let (can_back, can_forward) = match &self.session {
            Some(s) => (s.can_back(), s.can_forward()),
            None => (false, false),
        };
        egui::TopBottomPanel::bottom("nav").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui.add_enabled(can_back, egui::Button::new("<<")).clicked() {
                    self.navigate(false);
                }
                if ui.button("EXIT PROGRAM").clicked() {
                    ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                }
                if ui
                    .add_enabled(can_forward, egui::Button::new(">>"))
                    .clicked()
                {
                    self.navigate(true);
                }
            });
        });
    }

    pub(super) fn render_viewer(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            let Some(session) = &self.session else {
                ui.heading("Select a patient directory to start");
                return;
            };
            let index = session.cine().frame_index();
            let Some(texture) = self.textures.get(index) else {
                return;
            };
            let side = self.config.display_size as f32;
            let (resp, painter) =
                ui.allocate_painter(egui::Vec2::splat(side), egui::Sense::hover());
            let uv = egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0));
            painter.image(texture.id(), resp.rect, uv, egui::Color32::WHITE);
        });
    }
}
