//! Float texture storage for the simulation.
//!
//! Row 0 is the bottom of the field and `uv = (0, 0)` is its bottom-left
//! corner. Reads outside the field clamp to the nearest edge texel.

use glam::{Vec2, Vec4};

#[cfg(not(target_arch = "wasm32"))]
use rayon::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Filter {
    Nearest,
    Linear,
}

/// Runs `f(row_index, row)` over every `width`-sized row of `buf`.
pub(crate) fn for_each_row<T, F>(buf: &mut [T], width: usize, f: F)
where
    T: Send,
    F: Fn(usize, &mut [T]) + Sync + Send,
{
    if width == 0 {
        return;
    }

    #[cfg(not(target_arch = "wasm32"))]
    buf.par_chunks_mut(width)
        .enumerate()
        .for_each(|(y, row)| f(y, row));

    #[cfg(target_arch = "wasm32")]
    buf.chunks_mut(width)
        .enumerate()
        .for_each(|(y, row)| f(y, row));
}

/// Grid dimensions for a field whose short side is `resolution`, matching the
/// aspect ratio of a `width` x `height` surface.
pub fn grid_size(resolution: u32, width: u32, height: u32) -> (usize, usize) {
    let (w, h) = (width.max(1) as f32, height.max(1) as f32);
    let mut aspect = w / h;
    if aspect < 1.0 {
        aspect = 1.0 / aspect;
    }

    let min = (resolution as f32).round().max(1.0) as usize;
    let max = (resolution as f32 * aspect).round().max(1.0) as usize;

    if w > h { (max, min) } else { (min, max) }
}

#[derive(Debug, Clone)]
pub struct Field {
    width: usize,
    height: usize,
    texels: Vec<Vec4>,
}

impl Field {
    pub fn new(width: usize, height: usize) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        Self {
            width,
            height,
            texels: vec![Vec4::ZERO; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn texel_size(&self) -> Vec2 {
        Vec2::new(1.0 / self.width as f32, 1.0 / self.height as f32)
    }

    pub fn texels(&self) -> &[Vec4] {
        &self.texels
    }

    pub fn texel(&self, x: usize, y: usize) -> Vec4 {
        self.texels[y * self.width + x]
    }

    pub fn set_texel(&mut self, x: usize, y: usize, value: Vec4) {
        self.texels[y * self.width + x] = value;
    }

    /// Texel read with clamp-to-edge addressing.
    pub fn fetch(&self, x: isize, y: isize) -> Vec4 {
        let x = x.clamp(0, self.width as isize - 1) as usize;
        let y = y.clamp(0, self.height as isize - 1) as usize;
        self.texels[y * self.width + x]
    }

    pub fn sample(&self, uv: Vec2, filter: Filter) -> Vec4 {
        match filter {
            Filter::Nearest => {
                let x = (uv.x * self.width as f32).floor() as isize;
                let y = (uv.y * self.height as f32).floor() as isize;
                self.fetch(x, y)
            }
            Filter::Linear => {
                let st = uv * Vec2::new(self.width as f32, self.height as f32) - 0.5;
                let base = st.floor();
                let f = st - base;
                let (x, y) = (base.x as isize, base.y as isize);

                let a = self.fetch(x, y);
                let b = self.fetch(x + 1, y);
                let c = self.fetch(x, y + 1);
                let d = self.fetch(x + 1, y + 1);
                a.lerp(b, f.x).lerp(c.lerp(d, f.x), f.y)
            }
        }
    }

    /// Overwrites every texel with `kernel(uv, x, y)` evaluated at its center.
    pub fn fill_with<F>(&mut self, kernel: F)
    where
        F: Fn(Vec2, usize, usize) -> Vec4 + Sync + Send,
    {
        let (width, height) = (self.width, self.height);
        for_each_row(&mut self.texels, width, |y, row| {
            let v = (y as f32 + 0.5) / height as f32;
            for (x, texel) in row.iter_mut().enumerate() {
                let uv = Vec2::new((x as f32 + 0.5) / width as f32, v);
                *texel = kernel(uv, x, y);
            }
        });
    }

    pub fn clear(&mut self) {
        self.texels.fill(Vec4::ZERO);
    }

    /// A copy of this field at a new size, bilinearly resampled.
    pub fn resampled(&self, width: usize, height: usize, filter: Filter) -> Field {
        let mut target = Field::new(width, height);
        target.fill_with(|uv, _, _| self.sample(uv, filter));
        target
    }
}

/// A read/write pair of fields swapped after every pass that updates them.
#[derive(Debug, Clone)]
pub struct DoubleField {
    read: Field,
    write: Field,
}

impl DoubleField {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            read: Field::new(width, height),
            write: Field::new(width, height),
        }
    }

    pub fn read(&self) -> &Field {
        &self.read
    }

    pub fn width(&self) -> usize {
        self.read.width
    }

    pub fn height(&self) -> usize {
        self.read.height
    }

    pub fn texel_size(&self) -> Vec2 {
        self.read.texel_size()
    }

    /// The current contents and the target of the next pass.
    pub fn split_mut(&mut self) -> (&Field, &mut Field) {
        (&self.read, &mut self.write)
    }

    pub fn swap(&mut self) {
        std::mem::swap(&mut self.read, &mut self.write);
    }

    /// Writes `kernel` output into the write half and swaps.
    pub fn update<F>(&mut self, kernel: F)
    where
        F: Fn(&Field, Vec2, usize, usize) -> Vec4 + Sync + Send,
    {
        let (read, write) = self.split_mut();
        write.fill_with(|uv, x, y| kernel(read, uv, x, y));
        self.swap();
    }

    pub fn resampled(&self, width: usize, height: usize, filter: Filter) -> DoubleField {
        Self {
            read: self.read.resampled(width, height, filter),
            write: Field::new(width, height),
        }
    }
}
