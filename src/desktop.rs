use eframe::egui;

use crate::{Canvas, Host, InputEvent, LifecycleState, SplashConfig, SplashCursor};

/// Landing page content with the splash cursor mounted as a full-window overlay.
pub struct SplashApp {
    host: Host,
    cursor: SplashCursor,
    mount_attempted: bool,
    texture: Option<egui::TextureHandle>,
    pledges: usize,
}

/// Dye resolution the window runs with unless a config file sets one.
/// Every dye texel is stepped and drawn on the CPU each frame.
pub const WINDOW_DYE_RESOLUTION: u32 = 512;

impl SplashApp {
    /// Defaults for the interactive window.
    pub fn window_config() -> SplashConfig {
        SplashConfig {
            dye_resolution: WINDOW_DYE_RESOLUTION,
            ..SplashConfig::default()
        }
    }

    pub fn new(config: SplashConfig) -> Self {
        Self {
            host: Host::new(Canvas::new(0.0, 0.0, 1.0)),
            cursor: SplashCursor::new(config),
            mount_attempted: false,
            texture: None,
            pledges: 0,
        }
    }

    fn sync_canvas(&mut self, ctx: &egui::Context) {
        let screen = ctx.screen_rect();
        let mut canvas = self.host.canvas().borrow_mut();
        canvas.set_client_size(screen.width(), screen.height());
        canvas.set_pixel_ratio(ctx.pixels_per_point());
    }

    fn content(&mut self, ui: &mut egui::Ui) {
        ui.vertical_centered(|ui| {
            ui.add_space(48.0);
            ui.heading("GreenFootprint");
            ui.label("Track, understand and shrink your everyday carbon footprint.");
            ui.add_space(16.0);
            if ui.button("Take the pledge").clicked() {
                self.pledges += 1;
            }
            if self.pledges > 0 {
                ui.label(format!("{} pledges taken this session", self.pledges));
            }
        });
    }

    fn paint_overlay(&mut self, ctx: &egui::Context) {
        let canvas = self.host.canvas().borrow();
        let frame = canvas.frame();
        if frame.width() == 0 || frame.height() == 0 {
            return;
        }

        let image = egui::ColorImage::from_rgba_premultiplied(
            [frame.width() as usize, frame.height() as usize],
            frame.as_bytes(),
        );
        match &mut self.texture {
            Some(texture) => texture.set(image, egui::TextureOptions::LINEAR),
            None => {
                self.texture = Some(ctx.load_texture(
                    "splash_cursor",
                    image,
                    egui::TextureOptions::LINEAR,
                ));
            }
        }
        let Some(texture) = &self.texture else {
            return;
        };

        // Painting on a layer registers no widget, so clicks reach the content.
        let painter = ctx.layer_painter(egui::LayerId::new(
            egui::Order::Foreground,
            egui::Id::new("splash_cursor"),
        ));
        painter.image(
            texture.id(),
            ctx.screen_rect(),
            egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
            egui::Color32::WHITE,
        );
    }
}

/// Pointer input the effect reacts to. egui mirrors the primary touch as
/// pointer events, so touch events are not forwarded separately.
fn translate(event: &egui::Event) -> Option<InputEvent> {
    match event {
        egui::Event::PointerMoved(pos) => Some(InputEvent::PointerMove { x: pos.x, y: pos.y }),
        egui::Event::PointerButton {
            pos,
            button: egui::PointerButton::Primary,
            pressed: true,
            ..
        } => Some(InputEvent::PointerDown { x: pos.x, y: pos.y }),
        egui::Event::PointerButton {
            button: egui::PointerButton::Primary,
            pressed: false,
            ..
        } => Some(InputEvent::PointerUp),
        _ => None,
    }
}

impl eframe::App for SplashApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.sync_canvas(ctx);

        if !self.mount_attempted {
            self.mount_attempted = true;
            if let Err(err) = self.cursor.mount(&mut self.host) {
                log::error!("splash cursor disabled: {err}");
            }
        }

        let (time, events) = ctx.input(|i| (i.time, i.events.clone()));
        for event in events.iter().filter_map(translate) {
            self.host.input.dispatch(&event);
        }
        self.host.frames.run_frame(time);

        egui::CentralPanel::default().show(ctx, |ui| self.content(ui));

        if self.cursor.state() == LifecycleState::Running {
            self.paint_overlay(ctx);
        }

        ctx.request_repaint();
    }
}
