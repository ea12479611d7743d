//! Control strip for the flip panels piece

use egui::{Color32, Context, RichText};

/// Actions the control strip can request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlAction {
    TogglePause,
    RandomFlip,
}

/// Status shown next to the buttons
pub struct ControlStatus {
    pub paused: bool,
    pub panels: usize,
    pub active_flips: usize,
    pub idle_secs: f32,
}

/// Draw the control strip; returns the action clicked this frame, if any
pub fn draw_controls(ctx: &Context, status: &ControlStatus) -> Option<ControlAction> {
    let mut action = None;

    egui::TopBottomPanel::top("controls")
        .frame(egui::Frame::none().fill(Color32::from_black_alpha(120)).inner_margin(6.0))
        .show(ctx, |ui| {
            ui.horizontal(|ui| {
                let pause_label = if status.paused { "Resume" } else { "Pause" };
                if ui.button(pause_label).clicked() {
                    action = Some(ControlAction::TogglePause);
                }
                if ui.button("Random flip").clicked() {
                    action = Some(ControlAction::RandomFlip);
                }

                ui.separator();
                ui.label(
                    RichText::new(format!(
                        "panels {}   flipping {}   idle {:.1}s",
                        status.panels, status.active_flips, status.idle_secs
                    ))
                    .monospace()
                    .color(Color32::from_rgb(150, 200, 255)),
                );
                if status.paused {
                    ui.label(RichText::new("PAUSED").color(Color32::YELLOW));
                }
            });
        });

    action
}
