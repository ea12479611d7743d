//! Control strip for the tesseract piece
//!
//! A thin egui bar along the top edge with the piece's external controls.

use egui::{Color32, Context, RichText};

/// Actions the control strip can request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlAction {
    TogglePause,
    ClearTrail,
    SaveFrame,
}

/// Status shown next to the buttons
pub struct ControlStatus {
    pub paused: bool,
    pub ticks: u64,
    pub trail_frames: usize,
    pub velocity: f32,
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
                if ui.button("Clear trail").clicked() {
                    action = Some(ControlAction::ClearTrail);
                }
                if ui.button("Save frame").clicked() {
                    action = Some(ControlAction::SaveFrame);
                }

                ui.separator();
                ui.label(
                    RichText::new(format!(
                        "tick {}   ghosts {}   v {:.2}",
                        status.ticks, status.trail_frames, status.velocity
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
