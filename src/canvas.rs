//! The surface the effect presents into, and its DPI-aware sizing.

use image::RgbaImage;

use crate::device::Capabilities;
use crate::pointer::Viewport;
use crate::program::ProgramKind;

/// An RGBA8 pixel buffer, top row first, premultiplied alpha.
#[derive(Debug, Clone)]
pub struct Frame {
    width: u32,
    height: u32,
    pixels: Vec<[u8; 4]>,
}

impl Frame {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![[0; 4]; (width * height) as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[[u8; 4]] {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut [[u8; 4]] {
        &mut self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        self.pixels[(y * self.width + x) as usize]
    }

    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    pub fn to_image(&self) -> RgbaImage {
        RgbaImage::from_raw(self.width, self.height, self.as_bytes().to_vec())
            .unwrap_or_else(|| RgbaImage::new(self.width, self.height))
    }
}

/// A canvas element: CSS size, device pixel ratio and a backing store.
#[derive(Debug)]
pub struct Canvas {
    client_width: f32,
    client_height: f32,
    pixel_ratio: f32,
    frame: Frame,
    capabilities: Option<Capabilities>,
    rejected_programs: Vec<ProgramKind>,
    backing_store_resizes: usize,
}

impl Canvas {
    /// A canvas with a fully capable context and an unsized backing store.
    pub fn new(client_width: f32, client_height: f32, pixel_ratio: f32) -> Self {
        Self {
            client_width,
            client_height,
            pixel_ratio,
            frame: Frame::new(0, 0),
            capabilities: Some(Capabilities::FULL),
            rejected_programs: Vec::new(),
            backing_store_resizes: 0,
        }
    }

    /// Overrides what the canvas' context reports; `None` means no context.
    pub fn with_capabilities(mut self, capabilities: Option<Capabilities>) -> Self {
        self.capabilities = capabilities;
        self
    }

    pub fn capabilities(&self) -> Option<Capabilities> {
        self.capabilities
    }

    /// Program kinds the canvas' context fails to compile.
    pub fn with_rejected_programs(mut self, kinds: impl IntoIterator<Item = ProgramKind>) -> Self {
        self.rejected_programs = kinds.into_iter().collect();
        self
    }

    pub fn rejected_programs(&self) -> &[ProgramKind] {
        &self.rejected_programs
    }

    pub fn set_client_size(&mut self, width: f32, height: f32) {
        self.client_width = width;
        self.client_height = height;
    }

    pub fn client_size(&self) -> (f32, f32) {
        (self.client_width, self.client_height)
    }

    pub fn set_pixel_ratio(&mut self, pixel_ratio: f32) {
        self.pixel_ratio = pixel_ratio;
    }

    pub fn pixel_ratio(&self) -> f32 {
        self.pixel_ratio
    }

    pub fn scale_by_pixel_ratio(&self, css: f32) -> u32 {
        (css * self.pixel_ratio).floor().max(0.0) as u32
    }

    pub fn backing_size(&self) -> (u32, u32) {
        (self.frame.width, self.frame.height)
    }

    /// Matches the backing store to `client size x pixel ratio`.
    ///
    /// Returns `true` if the store was reallocated; its contents are then
    /// undefined until the next frame is presented.
    pub fn sync_backing_store(&mut self) -> bool {
        let width = self.scale_by_pixel_ratio(self.client_width);
        let height = self.scale_by_pixel_ratio(self.client_height);
        if (width, height) == self.backing_size() {
            return false;
        }

        log::debug!(
            "canvas backing store {}x{} -> {}x{}",
            self.frame.width,
            self.frame.height,
            width,
            height
        );
        self.frame = Frame::new(width, height);
        self.backing_store_resizes += 1;
        true
    }

    /// How many times the backing store has been reallocated.
    pub fn backing_store_resizes(&self) -> usize {
        self.backing_store_resizes
    }

    pub fn viewport(&self) -> Viewport {
        let (width, height) = self.backing_size();
        Viewport {
            width,
            height,
            pixel_ratio: self.pixel_ratio,
        }
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    pub fn frame_mut(&mut self) -> &mut Frame {
        &mut self.frame
    }
}
