use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use splashcursor::{
    AnalysisRecorder, Canvas, Host, ImageExporter, InputEvent, SplashApp, SplashConfig,
    SplashCursor,
};

const HEADLESS_WIDTH: f32 = 960.0;
const HEADLESS_HEIGHT: f32 = 540.0;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args: Vec<String> = std::env::args().skip(1).collect();
    let config = take_option(&mut args, "--config")?
        .map(|path| {
            SplashConfig::load(Path::new(&path))
                .with_context(|| format!("loading configuration from {path}"))
        })
        .transpose()?;

    if args.first().map(String::as_str) == Some("headless") {
        let config = config.unwrap_or_default();
        let frames = match args.get(1) {
            Some(n) => n.parse::<u64>().with_context(|| format!("invalid frame count {n:?}"))?,
            None => 60,
        };
        let out_dir = PathBuf::from(args.get(2).map(String::as_str).unwrap_or("splash_frames"));
        run_headless(config, frames, &out_dir)
    } else {
        run_gui_app(config.unwrap_or_else(SplashApp::window_config))
    }
}

fn take_option(args: &mut Vec<String>, name: &str) -> anyhow::Result<Option<String>> {
    let Some(index) = args.iter().position(|arg| arg == name) else {
        return Ok(None);
    };
    if index + 1 >= args.len() {
        bail!("{name} needs a value");
    }
    let value = args.remove(index + 1);
    args.remove(index);
    Ok(Some(value))
}

/// Mounts the effect on an offscreen canvas, drags a pointer across it and
/// writes every presented frame as a PNG.
fn run_headless(config: SplashConfig, frames: u64, out_dir: &Path) -> anyhow::Result<()> {
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("creating output directory {}", out_dir.display()))?;

    let mut host = Host::new(Canvas::new(HEADLESS_WIDTH, HEADLESS_HEIGHT, 1.0));
    let mut cursor = SplashCursor::new(config).with_seed(7);
    cursor.mount(&mut host)?;

    let mut recorder = AnalysisRecorder::new();
    host.input.dispatch(&InputEvent::PointerDown {
        x: HEADLESS_WIDTH * 0.2,
        y: HEADLESS_HEIGHT * 0.5,
    });

    for frame in 0..frames {
        let t = frame as f32 / frames.max(1) as f32;
        host.input.dispatch(&InputEvent::PointerMove {
            x: HEADLESS_WIDTH * (0.2 + 0.6 * t),
            y: HEADLESS_HEIGHT * (0.5 + 0.25 * (t * std::f32::consts::TAU).sin()),
        });
        host.frames.run_frame(frame as f64 / 60.0);

        let path = out_dir.join(format!("splash_{frame:04}.png"));
        ImageExporter::save_frame(host.canvas().borrow().frame(), &path)
            .with_context(|| format!("writing {}", path.display()))?;

        if let Some(metrics) = cursor.metrics() {
            if frame % 10 == 0 {
                metrics.log_summary();
            }
            recorder.record(metrics);
        }
    }
    host.input.dispatch(&InputEvent::PointerUp);

    let capture = cursor.capture()?;
    ImageExporter::save_png(&capture, &out_dir.join("capture.png"))?;

    recorder.log_trends();
    cursor.unmount(&mut host);
    log::info!("wrote {frames} frames to {}", out_dir.display());
    Ok(())
}

fn run_gui_app(config: SplashConfig) -> anyhow::Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1024.0, 720.0])
            .with_title("GreenFootprint"),
        ..Default::default()
    };

    eframe::run_native(
        "splashcursor",
        options,
        Box::new(|_cc| Box::new(SplashApp::new(config))),
    )
    .map_err(|err| anyhow::anyhow!("running the window failed: {err}"))
}
