use glam::{Vec2, Vec3, Vec4, Vec4Swizzles};

use crate::canvas::Frame;
use crate::config::SplashConfig;
use crate::device::Device;
use crate::field::{Field, Filter, for_each_row};
use crate::program::{Keyword, ProgramKind, vertex};

/// Floor of the diffuse lighting term; unlit areas keep this much of their color.
const AMBIENT: f32 = 0.7;

/// Composites the dye field into `frame`.
///
/// The frame is first cleared to transparent black, or to the background
/// color for opaque configurations, then the display program is blended over
/// it with premultiplied alpha. If the display program is unavailable the
/// cleared frame is left as is.
pub fn draw(device: &mut Device, dye: &Field, config: &SplashConfig, frame: &mut Frame) {
    let background = if config.transparent {
        Vec4::ZERO
    } else {
        config.back_color.to_vec3().extend(1.0)
    };
    frame.pixels_mut().fill(pack(background));

    let keywords = config.shading.then_some(Keyword::Shading);
    let Some(program) = device.program(ProgramKind::Display, keywords) else {
        return;
    };
    let shading = program.has(Keyword::Shading);
    let filter = device.filter();

    let (width, height) = (frame.width() as usize, frame.height() as usize);
    if width == 0 || height == 0 {
        return;
    }
    let texel = Vec2::new(1.0 / width as f32, 1.0 / height as f32);

    for_each_row(frame.pixels_mut(), width, |row, pixels| {
        // Frames are stored top row first, fields bottom row first.
        let v = ((height - 1 - row) as f32 + 0.5) / height as f32;
        for (x, pixel) in pixels.iter_mut().enumerate() {
            let uv = Vec2::new((x as f32 + 0.5) / width as f32, v);
            let src = display(dye, uv, texel, shading, filter).clamp(Vec4::ZERO, Vec4::ONE);
            let dst = unpack(*pixel);
            *pixel = pack(src + dst * (1.0 - src.w));
        }
    });
}

/// The display fragment: dye color, optionally lit by a normal derived from
/// the dye's luminance gradient, with alpha equal to its brightest channel.
pub fn display(dye: &Field, uv: Vec2, texel: Vec2, shading: bool, filter: Filter) -> Vec4 {
    let mut c = dye.sample(uv, filter).xyz();

    if shading {
        let n = vertex(uv, texel);
        let lc = dye.sample(n.l, filter).xyz();
        let rc = dye.sample(n.r, filter).xyz();
        let tc = dye.sample(n.t, filter).xyz();
        let bc = dye.sample(n.b, filter).xyz();

        let dx = rc.length() - lc.length();
        let dy = tc.length() - bc.length();
        let normal = Vec3::new(dx, dy, texel.length()).normalize();
        let diffuse = (normal.dot(Vec3::Z) + AMBIENT).clamp(AMBIENT, 1.0);
        c *= diffuse;
    }

    c.extend(c.max_element())
}

fn pack(color: Vec4) -> [u8; 4] {
    let c = (color.clamp(Vec4::ZERO, Vec4::ONE) * 255.0).round();
    [c.x as u8, c.y as u8, c.z as u8, c.w as u8]
}

fn unpack(pixel: [u8; 4]) -> Vec4 {
    Vec4::new(
        pixel[0] as f32,
        pixel[1] as f32,
        pixel[2] as f32,
        pixel[3] as f32,
    ) / 255.0
}
