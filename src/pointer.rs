//! Pointer state driven by input events.

use glam::{Vec2, Vec3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::color::{generate_color, wrap};

/// Identifier used for the mouse and for slots no touch is bound to.
pub const UNBOUND_POINTER_ID: i64 = -1;

/// Multiplier applied to the dye of the splat a press produces.
const CLICK_SPLAT_BRIGHTNESS: f32 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Backing store size in device pixels.
    pub width: u32,
    pub height: u32,
    pub pixel_ratio: f32,
}

impl Viewport {
    /// Normalized position of a point given in CSS pixels from the top-left.
    pub fn texcoord(&self, x: f32, y: f32) -> Vec2 {
        let px = (x * self.pixel_ratio).floor();
        let py = (y * self.pixel_ratio).floor();
        Vec2::new(
            px / self.width.max(1) as f32,
            1.0 - py / self.height.max(1) as f32,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Touch {
    pub id: i64,
    pub x: f32,
    pub y: f32,
}

/// Input delivered by the host, positions in CSS pixels relative to the canvas.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    PointerMove { x: f32, y: f32 },
    PointerDown { x: f32, y: f32 },
    PointerUp,
    TouchStart(Vec<Touch>),
    TouchMove(Vec<Touch>),
    TouchEnd(Vec<Touch>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Pointer {
    pub id: i64,
    pub texcoord: Vec2,
    pub prev_texcoord: Vec2,
    pub delta: Vec2,
    pub down: bool,
    pub moved: bool,
    pub color: Vec3,
}

impl Default for Pointer {
    fn default() -> Self {
        Self {
            id: UNBOUND_POINTER_ID,
            texcoord: Vec2::ZERO,
            prev_texcoord: Vec2::ZERO,
            delta: Vec2::ZERO,
            down: false,
            moved: false,
            color: Vec3::ZERO,
        }
    }
}

impl Pointer {
    fn press(&mut self, id: i64, texcoord: Vec2, color: Vec3) {
        self.id = id;
        self.down = true;
        self.moved = false;
        self.texcoord = texcoord;
        self.prev_texcoord = texcoord;
        self.delta = Vec2::ZERO;
        self.color = color;
    }

    fn move_to(&mut self, texcoord: Vec2) {
        self.prev_texcoord = self.texcoord;
        self.texcoord = texcoord;
        self.delta = self.texcoord - self.prev_texcoord;
        self.moved = self.delta.x != 0.0 || self.delta.y != 0.0;
    }

    fn release(&mut self) {
        self.down = false;
    }
}

/// A one-off impulse produced by a press.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClickSplat {
    pub point: Vec2,
    pub force: Vec2,
    pub color: Vec3,
}

/// Fixed set of pointer slots. Touch `i` of an event drives slot `i`; touches
/// past the last slot are ignored.
#[derive(Debug)]
pub struct PointerTracker {
    pointers: Vec<Pointer>,
    clicks: Vec<ClickSplat>,
    color_timer: f32,
    rng: StdRng,
}

impl PointerTracker {
    pub fn new(capacity: usize) -> Self {
        Self::with_rng(capacity, StdRng::from_entropy())
    }

    pub fn with_seed(capacity: usize, seed: u64) -> Self {
        Self::with_rng(capacity, StdRng::seed_from_u64(seed))
    }

    fn with_rng(capacity: usize, rng: StdRng) -> Self {
        Self {
            pointers: vec![Pointer::default(); capacity.max(1)],
            clicks: Vec::new(),
            color_timer: 0.0,
            rng,
        }
    }

    pub fn pointers(&self) -> &[Pointer] {
        &self.pointers
    }

    pub fn capacity(&self) -> usize {
        self.pointers.len()
    }

    pub fn handle(&mut self, event: &InputEvent, viewport: Viewport) {
        match event {
            InputEvent::PointerMove { x, y } => {
                self.pointer_move(0, viewport.texcoord(*x, *y));
            }
            InputEvent::PointerDown { x, y } => {
                self.pointer_down(0, UNBOUND_POINTER_ID, viewport.texcoord(*x, *y));
            }
            InputEvent::PointerUp => self.pointer_up(0),
            InputEvent::TouchStart(touches) => {
                for (slot, touch) in self.slots(touches) {
                    self.pointer_down(slot, touch.id, viewport.texcoord(touch.x, touch.y));
                }
            }
            InputEvent::TouchMove(touches) => {
                for (slot, touch) in self.slots(touches) {
                    self.pointer_move(slot, viewport.texcoord(touch.x, touch.y));
                }
            }
            InputEvent::TouchEnd(touches) => {
                for (slot, _) in self.slots(touches) {
                    self.pointer_up(slot);
                }
            }
        }
    }

    fn slots(&self, touches: &[Touch]) -> Vec<(usize, Touch)> {
        let capacity = self.pointers.len();
        if touches.len() > capacity {
            log::trace!(
                "ignoring {} touches beyond {} pointer slots",
                touches.len() - capacity,
                capacity
            );
        }
        touches.iter().copied().enumerate().take(capacity).collect()
    }

    pub fn pointer_down(&mut self, slot: usize, id: i64, texcoord: Vec2) {
        let Some(pointer) = self.pointers.get_mut(slot) else {
            return;
        };
        let color = generate_color(&mut self.rng);
        pointer.press(id, texcoord, color);

        let click_color = generate_color(&mut self.rng) * CLICK_SPLAT_BRIGHTNESS;
        let force = Vec2::new(
            10.0 * (self.rng.r#gen::<f32>() - 0.5),
            30.0 * (self.rng.r#gen::<f32>() - 0.5),
        );
        self.clicks.push(ClickSplat {
            point: texcoord,
            force,
            color: click_color,
        });
    }

    /// Moves a slot. A pointer that was never pressed picks its color on
    /// the first move, so hovering alone leaves dye behind.
    pub fn pointer_move(&mut self, slot: usize, texcoord: Vec2) {
        let Some(pointer) = self.pointers.get_mut(slot) else {
            return;
        };
        if pointer.color == Vec3::ZERO {
            pointer.color = generate_color(&mut self.rng);
        }
        pointer.move_to(texcoord);
    }

    pub fn pointer_up(&mut self, slot: usize) {
        if let Some(pointer) = self.pointers.get_mut(slot) {
            pointer.release();
        }
    }

    /// Advances the color drift timer, recoloring every pointer when it wraps.
    pub fn update_colors(&mut self, dt: f32, speed: f32) {
        self.color_timer += dt * speed;
        if self.color_timer >= 1.0 {
            self.color_timer = wrap(self.color_timer, 0.0, 1.0);
            for pointer in &mut self.pointers {
                pointer.color = generate_color(&mut self.rng);
            }
        }
    }

    /// Pointers that moved since the last call, with their `moved` flag cleared.
    pub fn take_moved(&mut self) -> Vec<Pointer> {
        let mut moved = Vec::new();
        for pointer in self.pointers.iter_mut().filter(|p| p.moved) {
            pointer.moved = false;
            moved.push(pointer.clone());
        }
        moved
    }

    pub fn take_click_splats(&mut self) -> Vec<ClickSplat> {
        std::mem::take(&mut self.clicks)
    }
}
