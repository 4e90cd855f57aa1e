// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Video playback controls.
//!
//! Shown under the properties panel when the media is a video. The
//! controller keeps the play/mute flags; Space toggles playback as well.

use crate::canvas::CanvasController;

/// Display play/pause and mute buttons.
pub fn show(ui: &mut egui::Ui, controller: &mut CanvasController) {
    let video = controller.video();
    ui.horizontal(|ui| {
        let play_text = if video.playing { "⏸ Pause" } else { "▶ Play" };
        if ui.button(play_text).on_hover_text("Space").clicked() {
            controller.toggle_playback();
        }
        let mute_text = if video.muted { "🔇" } else { "🔊" };
        if ui
            .button(mute_text)
            .on_hover_text(if video.muted { "Unmute" } else { "Mute" })
            .clicked()
        {
            controller.toggle_mute();
        }
    });
}
