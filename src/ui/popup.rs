use std::time::Instant;

use anyhow::Result;
use eframe::egui::{self, Color32, FontId, RichText};

use crate::alarm::model::PopupContent;
use crate::alarm::settings::PopupSettings;
use crate::time_provider::{Clock, SystemClock};
use crate::ui::state::{DismissReason, PopupPhase, PopupState};

const MIN_WIDTH: f32 = 320.0;
const PADDING: f32 = 18.0;

pub fn run_popup(content: PopupContent, settings: &PopupSettings) -> Result<()> {
    let app = RingPopup::new(content, settings);
    log::debug!(
        "opening popup '{}' (live clock: {})",
        app.state.text(),
        app.state.refreshes()
    );

    let mut viewport = egui::ViewportBuilder::default()
        .with_title(settings.title.clone())
        .with_inner_size(initial_size(app.state.text(), settings.font_size))
        .with_resizable(false);
    if settings.always_on_top {
        viewport = viewport.with_always_on_top();
    }
    let native_options = eframe::NativeOptions {
        viewport,
        centered: true,
        ..Default::default()
    };

    let background = app.background;
    eframe::run_native(
        &settings.title,
        native_options,
        Box::new(move |cc| {
            configure_theme(&cc.egui_ctx, background);
            Ok(Box::new(app))
        }),
    )
    .map_err(|err| anyhow::anyhow!("failed to open ring popup: {err}"))?;

    Ok(())
}

fn configure_theme(ctx: &egui::Context, background: Color32) {
    let mut visuals = egui::Visuals::light();
    visuals.panel_fill = background;
    visuals.window_fill = background;
    visuals.widgets.inactive.weak_bg_fill = background;
    visuals.widgets.hovered.weak_bg_fill = background;
    visuals.widgets.active.weak_bg_fill = background;
    ctx.set_visuals(visuals);
}

/// Rough size that fits the text on one line.
fn initial_size(text: &str, font_size: f32) -> [f32; 2] {
    let glyphs = text.chars().count().max(8) as f32;
    let width = (glyphs * font_size * 0.62 + PADDING * 4.0).max(MIN_WIDTH);
    let height = font_size * 2.0 + PADDING * 4.0;
    [width, height]
}

fn rgb(color: [u8; 3]) -> Color32 {
    Color32::from_rgb(color[0], color[1], color[2])
}

struct RingPopup {
    state: PopupState,
    clock: SystemClock,
    font_size: f32,
    foreground: Color32,
    background: Color32,
    focused: bool,
}

impl RingPopup {
    fn new(content: PopupContent, settings: &PopupSettings) -> Self {
        let clock = SystemClock;
        let mut state = PopupState::new(content, settings.style, settings.refresh_interval);
        state.open(Instant::now(), clock.now());
        Self {
            state,
            clock,
            font_size: settings.font_size,
            foreground: rgb(settings.foreground),
            background: rgb(settings.background),
            focused: false,
        }
    }

    fn keyboard_dismissal(ctx: &egui::Context) -> Option<DismissReason> {
        ctx.input(|input| {
            if input.viewport().close_requested() {
                Some(DismissReason::WindowClosed)
            } else if input.key_pressed(egui::Key::Escape) {
                Some(DismissReason::Escape)
            } else if (input.modifiers.ctrl || input.modifiers.command)
                && input.key_pressed(egui::Key::Q)
            {
                Some(DismissReason::DismissShortcut)
            } else {
                None
            }
        })
    }
}

impl eframe::App for RingPopup {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if !self.focused {
            ctx.send_viewport_cmd(egui::ViewportCommand::Focus);
            self.focused = true;
        }

        self.state.tick(Instant::now(), self.clock.now());

        let mut dismissal = Self::keyboard_dismissal(ctx);

        egui::CentralPanel::default()
            .frame(egui::Frame::default().fill(self.background).inner_margin(PADDING))
            .show(ctx, |ui| {
                ui.centered_and_justified(|ui| {
                    let text = RichText::new(self.state.text())
                        .font(FontId::proportional(self.font_size))
                        .color(self.foreground);
                    let button = egui::Button::new(text).fill(self.background);
                    if ui.add(button).clicked() {
                        dismissal.get_or_insert(DismissReason::Click);
                    }
                });
            });

        if let Some(reason) = dismissal {
            self.state.dismiss(reason);
        }

        if self.state.phase() == PopupPhase::Terminated {
            if self.state.dismissed_by() != Some(DismissReason::WindowClosed) {
                ctx.send_viewport_cmd(egui::ViewportCommand::Close);
            }
            return;
        }

        if let Some(wait) = self.state.until_next_refresh(Instant::now()) {
            ctx.request_repaint_after(wait);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_size_grows_with_text() {
        let short = initial_size("Hi", 48.0);
        let long = initial_size("Call The Dentist Before Noon", 48.0);
        assert_eq!(short[0], MIN_WIDTH.max(8.0 * 48.0 * 0.62 + PADDING * 4.0));
        assert!(long[0] > short[0]);
        assert_eq!(short[1], long[1]);
    }

    fn dismissal_for(
        events: Vec<egui::Event>,
        modifiers: egui::Modifiers,
        close_requested: bool,
    ) -> Option<DismissReason> {
        let mut raw = egui::RawInput {
            events,
            modifiers,
            ..Default::default()
        };
        if close_requested {
            raw.viewports
                .entry(egui::ViewportId::ROOT)
                .or_default()
                .events
                .push(egui::ViewportEvent::Close);
        }
        let ctx = egui::Context::default();
        let mut dismissal = None;
        let _ = ctx.run(raw, |ctx| dismissal = RingPopup::keyboard_dismissal(ctx));
        dismissal
    }

    fn key_press(key: egui::Key, modifiers: egui::Modifiers) -> egui::Event {
        egui::Event::Key {
            key,
            physical_key: None,
            pressed: true,
            repeat: false,
            modifiers,
        }
    }

    #[test]
    fn escape_dismisses() {
        let none = egui::Modifiers::NONE;
        assert_eq!(
            dismissal_for(vec![key_press(egui::Key::Escape, none)], none, false),
            Some(DismissReason::Escape)
        );
    }

    #[test]
    fn ctrl_q_dismisses() {
        let ctrl = egui::Modifiers::CTRL;
        assert_eq!(
            dismissal_for(vec![key_press(egui::Key::Q, ctrl)], ctrl, false),
            Some(DismissReason::DismissShortcut)
        );
    }

    #[test]
    fn bare_q_is_ignored() {
        let none = egui::Modifiers::NONE;
        assert_eq!(
            dismissal_for(vec![key_press(egui::Key::Q, none)], none, false),
            None
        );
        assert_eq!(dismissal_for(Vec::new(), none, false), None);
    }

    #[test]
    fn window_close_dismisses() {
        assert_eq!(
            dismissal_for(Vec::new(), egui::Modifiers::NONE, true),
            Some(DismissReason::WindowClosed)
        );
    }

    #[test]
    fn rgb_maps_channels() {
        assert_eq!(rgb([255, 248, 220]), Color32::from_rgb(255, 248, 220));
    }
}
