// src/ui.rs

use glam::Vec3;

/// Snapshot of the scene state shown in the overlay.
pub struct OverlayInfo {
    pub camera_position: Vec3,
    pub pitch_deg: f32,
    pub yaw_deg: f32,
    pub mounted: bool,
    pub mouse_look: bool,
    pub steps: u64,
}

pub fn build_ui(ctx: &egui::Context, info: &OverlayInfo) {
    egui::Window::new("SnowMan")
        .anchor(egui::Align2::LEFT_TOP, egui::vec2(10.0, 10.0))
        .resizable(false)
        .show(ctx, |ui| {
            ui.vertical(|ui| {
                let p = info.camera_position;
                ui.label(format!("Camera: ({:.2}, {:.2}, {:.2})", p.x, p.y, p.z));
                ui.label(format!("Pitch {:.1}°  Yaw {:.1}°", info.pitch_deg, info.yaw_deg));
                ui.label(if info.mounted { "Riding the platform (F to step off)" } else { "On foot" });
                ui.label(format!("Steps: {}", info.steps));
                ui.separator();

                ui.label("🎮 Keyboard Controls:");
                ui.label("   W/S: Walk");
                ui.label("   A/D: Strafe");
                ui.label("   Q/E: Turn");
                ui.label("   Z/C: Look Up/Down");
                ui.label("   F: Dismount");
                ui.label("   Escape: Quit");
                if info.mouse_look {
                    ui.label("   Mouse: Look (release left button to free cursor)");
                } else {
                    ui.label("   Hold left mouse button: Mouse look");
                }
                ui.label("   Wheel: Walk");
            });
        });
}
