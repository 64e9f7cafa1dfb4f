//! Velocity/dye field stepping.
//!
//! One [`Simulation::step`] runs the full stable-fluids pipeline: curl,
//! vorticity confinement, divergence, pressure solve, gradient subtraction
//! and semi-Lagrangian advection of velocity and dye with dissipation.

use glam::{Vec2, Vec3, Vec4, Vec4Swizzles};

use crate::config::SplashConfig;
use crate::device::Device;
use crate::field::{DoubleField, Field, Filter, grid_size};
use crate::pointer::{ClickSplat, Pointer};
use crate::program::{Keyword, ProgramKind, vertex};

/// Velocity components are clamped to this magnitude after vorticity confinement.
const MAX_VELOCITY: f32 = 1000.0;

pub struct Simulation {
    config: SplashConfig,
    canvas_width: u32,
    canvas_height: u32,
    velocity: DoubleField,
    dye: DoubleField,
    divergence: Field,
    curl: Field,
    pressure: DoubleField,
}

impl Simulation {
    /// Allocates fields for a canvas backing store of `width` x `height`.
    pub fn new(config: &SplashConfig, width: u32, height: u32) -> Self {
        let (sim_w, sim_h) = grid_size(config.sim_resolution, width, height);
        let (dye_w, dye_h) = grid_size(config.dye_resolution, width, height);
        log::debug!("simulation grid {sim_w}x{sim_h}, dye grid {dye_w}x{dye_h}");

        Self {
            config: config.clone(),
            canvas_width: width,
            canvas_height: height,
            velocity: DoubleField::new(sim_w, sim_h),
            dye: DoubleField::new(dye_w, dye_h),
            divergence: Field::new(sim_w, sim_h),
            curl: Field::new(sim_w, sim_h),
            pressure: DoubleField::new(sim_w, sim_h),
        }
    }

    /// Reallocates every field for a new canvas size. Velocity and dye are
    /// resampled into the new grids; the solver scratch fields start empty.
    pub fn resize(&mut self, device: &mut Device, width: u32, height: u32) {
        self.canvas_width = width;
        self.canvas_height = height;

        let (sim_w, sim_h) = grid_size(self.config.sim_resolution, width, height);
        let (dye_w, dye_h) = grid_size(self.config.dye_resolution, width, height);

        if device.program(ProgramKind::Copy, []).is_some() {
            let filter = device.filter();
            self.velocity = self.velocity.resampled(sim_w, sim_h, filter);
            self.dye = self.dye.resampled(dye_w, dye_h, filter);
        } else {
            self.velocity = DoubleField::new(sim_w, sim_h);
            self.dye = DoubleField::new(dye_w, dye_h);
        }
        self.divergence = Field::new(sim_w, sim_h);
        self.curl = Field::new(sim_w, sim_h);
        self.pressure = DoubleField::new(sim_w, sim_h);
    }

    pub fn config(&self) -> &SplashConfig {
        &self.config
    }

    pub fn velocity(&self) -> &Field {
        self.velocity.read()
    }

    pub fn dye(&self) -> &Field {
        self.dye.read()
    }

    pub fn curl(&self) -> &Field {
        &self.curl
    }

    pub fn divergence(&self) -> &Field {
        &self.divergence
    }

    fn aspect_ratio(&self) -> f32 {
        self.canvas_width.max(1) as f32 / self.canvas_height.max(1) as f32
    }

    fn corrected_radius(&self) -> f32 {
        let radius = self.config.splat_radius / 100.0;
        let aspect = self.aspect_ratio();
        if aspect > 1.0 { radius * aspect } else { radius }
    }

    /// Adds a Gaussian impulse of `force` to velocity and `color` to dye,
    /// centered at `point` in normalized canvas coordinates.
    pub fn splat(&mut self, device: &mut Device, point: Vec2, force: Vec2, color: Vec3) {
        if device.program(ProgramKind::Splat, []).is_none() {
            return;
        }

        let aspect = self.aspect_ratio();
        let radius = self.corrected_radius();
        splat_into(&mut self.velocity, point, force.extend(0.0), radius, aspect);
        splat_into(&mut self.dye, point, color, radius, aspect);
    }

    /// Splats a moved pointer, scaling its delta by the configured force.
    pub fn splat_pointer(&mut self, device: &mut Device, pointer: &Pointer) {
        let aspect = self.aspect_ratio();
        let mut delta = pointer.delta;
        if aspect < 1.0 {
            delta.x *= aspect;
        }
        if aspect > 1.0 {
            delta.y /= aspect;
        }

        let force = delta * self.config.splat_force;
        self.splat(device, pointer.texcoord, force, pointer.color);
    }

    pub fn splat_click(&mut self, device: &mut Device, click: &ClickSplat) {
        self.splat(device, click.point, click.force, click.color);
    }

    pub fn step(&mut self, device: &mut Device, dt: f32) {
        let filter = device.filter();
        let texel = self.velocity.texel_size();

        if device.program(ProgramKind::Curl, []).is_some() {
            let velocity = self.velocity.read();
            self.curl.fill_with(|uv, _, _| {
                let n = vertex(uv, texel);
                let l = velocity.sample(n.l, filter).y;
                let r = velocity.sample(n.r, filter).y;
                let t = velocity.sample(n.t, filter).x;
                let b = velocity.sample(n.b, filter).x;
                let vorticity = r - l - t + b;
                Vec4::new(0.5 * vorticity, 0.0, 0.0, 1.0)
            });
        }

        if device.program(ProgramKind::Vorticity, []).is_some() {
            let curl = &self.curl;
            let strength = self.config.curl;
            self.velocity.update(|velocity, uv, x, y| {
                let n = vertex(uv, texel);
                let l = curl.sample(n.l, filter).x;
                let r = curl.sample(n.r, filter).x;
                let t = curl.sample(n.t, filter).x;
                let b = curl.sample(n.b, filter).x;
                let c = curl.texel(x, y).x;

                let mut force = 0.5 * Vec2::new(t.abs() - b.abs(), r.abs() - l.abs());
                force /= force.length() + 0.0001;
                force *= strength * c;
                force.y = -force.y;

                let v = velocity.texel(x, y).xy() + force * dt;
                v.clamp(Vec2::splat(-MAX_VELOCITY), Vec2::splat(MAX_VELOCITY))
                    .extend(0.0)
                    .extend(1.0)
            });
        }

        if device.program(ProgramKind::Divergence, []).is_some() {
            let velocity = self.velocity.read();
            self.divergence.fill_with(|uv, x, y| {
                let n = vertex(uv, texel);
                let c = velocity.texel(x, y);
                let mut l = velocity.sample(n.l, filter).x;
                let mut r = velocity.sample(n.r, filter).x;
                let mut t = velocity.sample(n.t, filter).y;
                let mut b = velocity.sample(n.b, filter).y;

                if n.l.x < 0.0 {
                    l = -c.x;
                }
                if n.r.x > 1.0 {
                    r = -c.x;
                }
                if n.t.y > 1.0 {
                    t = -c.y;
                }
                if n.b.y < 0.0 {
                    b = -c.y;
                }

                Vec4::new(0.5 * (r - l + t - b), 0.0, 0.0, 1.0)
            });
        }

        if device.program(ProgramKind::Clear, []).is_some() {
            let keep = self.config.pressure;
            self.pressure.update(|pressure, _, x, y| pressure.texel(x, y) * keep);
        }

        if device.program(ProgramKind::Pressure, []).is_some() {
            let divergence = &self.divergence;
            for _ in 0..self.config.pressure_iterations {
                self.pressure.update(|pressure, uv, x, y| {
                    let n = vertex(uv, texel);
                    let l = pressure.sample(n.l, filter).x;
                    let r = pressure.sample(n.r, filter).x;
                    let t = pressure.sample(n.t, filter).x;
                    let b = pressure.sample(n.b, filter).x;
                    let div = divergence.texel(x, y).x;
                    Vec4::new((l + r + b + t - div) * 0.25, 0.0, 0.0, 1.0)
                });
            }
        }

        if device.program(ProgramKind::GradientSubtract, []).is_some() {
            let pressure = self.pressure.read();
            self.velocity.update(|velocity, uv, x, y| {
                let n = vertex(uv, texel);
                let l = pressure.sample(n.l, filter).x;
                let r = pressure.sample(n.r, filter).x;
                let t = pressure.sample(n.t, filter).x;
                let b = pressure.sample(n.b, filter).x;
                let v = velocity.texel(x, y).xy() - Vec2::new(r - l, t - b);
                Vec4::new(v.x, v.y, 0.0, 1.0)
            });
        }

        let advection_keywords = device.advection_keywords();
        if let Some(advection) = device.program(ProgramKind::Advection, advection_keywords) {
            let manual = advection.has(Keyword::ManualFiltering);
            let sampler = Sampler { filter, manual };

            let decay = 1.0 + self.config.velocity_dissipation * dt;
            self.velocity.update(|velocity, uv, _, _| {
                let coord = uv - dt * sampler.sample(velocity, uv).xy() * texel;
                sampler.sample(velocity, coord) / decay
            });

            let decay = 1.0 + self.config.density_dissipation * dt;
            let velocity = self.velocity.read();
            self.dye.update(|dye, uv, _, _| {
                let coord = uv - dt * sampler.sample(velocity, uv).xy() * texel;
                sampler.sample(dye, coord) / decay
            });
        }
    }
}

fn splat_into(target: &mut DoubleField, point: Vec2, value: Vec3, radius: f32, aspect: f32) {
    target.update(|field, uv, x, y| {
        let mut p = uv - point;
        p.x *= aspect;
        let splat = (-p.dot(p) / radius).exp() * value;
        (field.texel(x, y).xyz() + splat).extend(1.0)
    });
}

/// Interpolating reads for the advection program. Without hardware linear
/// filtering the program interpolates four nearest-texel reads itself.
#[derive(Clone, Copy)]
struct Sampler {
    filter: Filter,
    manual: bool,
}

impl Sampler {
    fn sample(self, field: &Field, uv: Vec2) -> Vec4 {
        if !self.manual {
            return field.sample(uv, self.filter);
        }

        let texel = field.texel_size();
        let st = uv / texel - 0.5;
        let base = st.floor();
        let f = st - base;

        let fetch = |offset: Vec2| field.sample((base + offset + 0.5) * texel, Filter::Nearest);
        let a = fetch(Vec2::new(0.0, 0.0));
        let b = fetch(Vec2::new(1.0, 0.0));
        let c = fetch(Vec2::new(0.0, 1.0));
        let d = fetch(Vec2::new(1.0, 1.0));
        a.lerp(b, f.x).lerp(c.lerp(d, f.x), f.y)
    }
}
