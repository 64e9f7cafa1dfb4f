use std::io::Cursor;
use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::{ImageFormat, RgbaImage};

use crate::canvas::Frame;
use crate::config::SplashConfig;
use crate::device::Device;
use crate::error::Result;
use crate::field::{Field, grid_size};
use crate::render;

/// Renders the dye field at `config.capture_resolution`, keeping the aspect
/// ratio of a `canvas_width` x `canvas_height` canvas.
pub fn capture(
    device: &mut Device,
    dye: &Field,
    config: &SplashConfig,
    canvas_width: u32,
    canvas_height: u32,
) -> RgbaImage {
    let (width, height) = grid_size(config.capture_resolution, canvas_width, canvas_height);
    let mut frame = Frame::new(width as u32, height as u32);
    render::draw(device, dye, config, &mut frame);
    frame.to_image()
}

pub struct ImageExporter;

impl ImageExporter {
    pub fn png_bytes(image: &RgbaImage) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
        Ok(bytes)
    }

    /// A `data:` URL holding the image as PNG.
    pub fn data_url(image: &RgbaImage) -> Result<String> {
        let bytes = Self::png_bytes(image)?;
        Ok(format!("data:image/png;base64,{}", STANDARD.encode(bytes)))
    }

    pub fn save_png(image: &RgbaImage, path: &Path) -> Result<()> {
        image.save_with_format(path, ImageFormat::Png)?;
        Ok(())
    }

    pub fn save_frame(frame: &Frame, path: &Path) -> Result<()> {
        Self::save_png(&frame.to_image(), path)
    }
}
