//! Pointer-driven fluid splash effect.
//!
//! A [`SplashCursor`] mounts onto a [`Host`] page: it subscribes to pointer
//! input, registers a per-frame callback that splats moved pointers into a
//! velocity/dye field, steps the field, and composites it into the host's
//! [`Canvas`].

pub mod analysis;
pub mod canvas;
pub mod color;
pub mod config;
pub mod cursor;
pub mod desktop;
pub mod device;
pub mod error;
pub mod export;
pub mod field;
pub mod host;
pub mod pointer;
pub mod program;
pub mod render;
pub mod simulation;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use analysis::{AnalysisRecorder, FieldMetrics};
pub use canvas::{Canvas, Frame};
pub use config::{Rgb, SplashConfig};
pub use cursor::{FrameProbe, LifecycleState, SplashCursor};
pub use desktop::SplashApp;
pub use device::{Capabilities, Device};
pub use error::{Result, SplashError};
pub use export::ImageExporter;
pub use field::{DoubleField, Field, Filter};
pub use host::{FrameScheduler, Host, InputHub};
pub use pointer::{InputEvent, Pointer, PointerTracker, Touch, Viewport};
pub use program::{Keyword, ProgramCache, ProgramKind};
pub use simulation::Simulation;
