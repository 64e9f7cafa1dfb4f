//! The mountable splash cursor component.
//!
//! Mounting acquires the canvas' device, allocates the simulation and
//! registers one input subscription and one frame callback with the host.
//! Unmounting removes both by the ids returned at registration and drops the
//! device resources in one go. The callbacks also hold the shared lifecycle
//! state and do nothing unless the component is running.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use image::RgbaImage;

use crate::analysis::FieldMetrics;
use crate::canvas::Canvas;
use crate::config::SplashConfig;
use crate::device::Device;
use crate::error::{Result, SplashError};
use crate::export;
use crate::host::{FrameRequestId, Host, SubscriptionId};
use crate::pointer::{InputEvent, Pointer, PointerTracker};
use crate::render;
use crate::simulation::Simulation;

/// Upper bound on the simulated time between two frames, in seconds.
pub const MAX_FRAME_DT: f32 = 1.0 / 60.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Unmounted,
    Initializing,
    Running,
    /// Initialization failed; the component never renders again.
    Failed,
}

/// Everything allocated on the device for one mount.
struct Resources {
    device: Device,
    simulation: Simulation,
    last_frame: Option<f64>,
}

impl Resources {
    fn frame(&mut self, now: f64, tracker: &mut PointerTracker, canvas: &mut Canvas) {
        let dt = self.delta_time(now);

        if canvas.sync_backing_store() {
            let (width, height) = canvas.backing_size();
            self.simulation.resize(&mut self.device, width, height);
        }

        let color_update_speed = self.simulation.config().color_update_speed;
        tracker.update_colors(dt, color_update_speed);

        for click in tracker.take_click_splats() {
            self.simulation.splat_click(&mut self.device, &click);
        }
        for pointer in tracker.take_moved() {
            self.simulation.splat_pointer(&mut self.device, &pointer);
        }

        self.simulation.step(&mut self.device, dt);
        render::draw(
            &mut self.device,
            self.simulation.dye(),
            self.simulation.config(),
            canvas.frame_mut(),
        );
    }

    fn delta_time(&mut self, now: f64) -> f32 {
        let dt = frame_delta(self.last_frame, now);
        self.last_frame = Some(now);
        dt
    }
}

/// Simulated seconds for a frame at `now` following one at `last`, clamped
/// to `[0, MAX_FRAME_DT]`. The first frame steps by `MAX_FRAME_DT`.
pub fn frame_delta(last: Option<f64>, now: f64) -> f32 {
    match last {
        Some(last) => ((now - last) as f32).clamp(0.0, MAX_FRAME_DT),
        None => MAX_FRAME_DT,
    }
}

/// Read-only view of a component's rendered frame count.
#[derive(Debug, Clone)]
pub struct FrameProbe(Rc<Cell<u64>>);

impl FrameProbe {
    pub fn get(&self) -> u64 {
        self.0.get()
    }
}

pub struct SplashCursor {
    config: SplashConfig,
    pointer_capacity: usize,
    seed: Option<u64>,
    state: Rc<Cell<LifecycleState>>,
    tracker: Rc<RefCell<PointerTracker>>,
    resources: Rc<RefCell<Option<Resources>>>,
    frames: Rc<Cell<u64>>,
    canvas: Option<Rc<RefCell<Canvas>>>,
    subscription: Option<SubscriptionId>,
    frame_request: Option<FrameRequestId>,
}

impl SplashCursor {
    pub fn new(config: SplashConfig) -> Self {
        Self {
            config,
            pointer_capacity: 1,
            seed: None,
            state: Rc::new(Cell::new(LifecycleState::Unmounted)),
            tracker: Rc::new(RefCell::new(PointerTracker::new(1))),
            resources: Rc::new(RefCell::new(None)),
            frames: Rc::new(Cell::new(0)),
            canvas: None,
            subscription: None,
            frame_request: None,
        }
    }

    /// Number of pointer slots touches can drive.
    pub fn with_pointer_capacity(mut self, capacity: usize) -> Self {
        self.pointer_capacity = capacity.max(1);
        self
    }

    /// Makes pointer colors reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    fn new_tracker(&self) -> PointerTracker {
        match self.seed {
            Some(seed) => PointerTracker::with_seed(self.pointer_capacity, seed),
            None => PointerTracker::new(self.pointer_capacity),
        }
    }

    pub fn mount(&mut self, host: &mut Host) -> Result<()> {
        match self.state.get() {
            LifecycleState::Unmounted => {}
            LifecycleState::Failed => return Err(SplashError::ContextUnavailable),
            LifecycleState::Initializing | LifecycleState::Running => {
                log::warn!("splash cursor is already mounted");
                return Ok(());
            }
        }
        self.state.set(LifecycleState::Initializing);

        let canvas = Rc::clone(host.canvas());
        let device = match Device::acquire(&canvas.borrow()) {
            Ok(device) => device,
            Err(err) => {
                log::error!("splash cursor failed to initialize: {err}");
                self.state.set(LifecycleState::Failed);
                return Err(err);
            }
        };

        let capabilities = device.capabilities();
        let effective = self.config.downgrade(capabilities);
        if effective != self.config {
            log::warn!(
                "device capabilities {:?}: dye resolution {} -> {}, shading {} -> {}",
                capabilities,
                self.config.dye_resolution,
                effective.dye_resolution,
                self.config.shading,
                effective.shading
            );
        }

        let (width, height) = {
            let mut canvas = canvas.borrow_mut();
            canvas.sync_backing_store();
            canvas.backing_size()
        };
        let simulation = Simulation::new(&effective, width, height);
        *self.resources.borrow_mut() = Some(Resources {
            device,
            simulation,
            last_frame: None,
        });
        *self.tracker.borrow_mut() = self.new_tracker();
        self.frames.set(0);

        let state = Rc::clone(&self.state);
        let tracker = Rc::clone(&self.tracker);
        let input_canvas = Rc::clone(&canvas);
        self.subscription = Some(host.input.subscribe(Box::new(move |event: &InputEvent| {
            if state.get() != LifecycleState::Running {
                return;
            }
            let viewport = input_canvas.borrow().viewport();
            tracker.borrow_mut().handle(event, viewport);
        })));

        let state = Rc::clone(&self.state);
        let tracker = Rc::clone(&self.tracker);
        let resources = Rc::clone(&self.resources);
        let frames = Rc::clone(&self.frames);
        let frame_canvas = Rc::clone(&canvas);
        self.frame_request = Some(host.frames.request(Box::new(move |now: f64| {
            if state.get() != LifecycleState::Running {
                return;
            }
            let mut slot = resources.borrow_mut();
            let Some(mounted) = slot.as_mut() else {
                return;
            };
            mounted.frame(now, &mut tracker.borrow_mut(), &mut frame_canvas.borrow_mut());
            frames.set(frames.get() + 1);
        })));

        self.canvas = Some(canvas);
        self.state.set(LifecycleState::Running);
        log::info!("splash cursor mounted on a {width}x{height} canvas");
        Ok(())
    }

    pub fn unmount(&mut self, host: &mut Host) {
        if let Some(id) = self.subscription.take() {
            if !host.input.unsubscribe(id) {
                log::warn!("input subscription {id:?} was already removed");
            }
        }
        if let Some(id) = self.frame_request.take() {
            host.frames.cancel(id);
        }
        self.resources.borrow_mut().take();
        self.canvas = None;

        if self.state.get() != LifecycleState::Failed {
            self.state.set(LifecycleState::Unmounted);
            log::info!("splash cursor unmounted after {} frames", self.frames.get());
        }
    }

    pub fn state(&self) -> LifecycleState {
        self.state.get()
    }

    pub fn config(&self) -> &SplashConfig {
        &self.config
    }

    /// The configuration the mounted device runs with.
    pub fn effective_config(&self) -> Option<SplashConfig> {
        self.resources
            .borrow()
            .as_ref()
            .map(|resources| resources.simulation.config().clone())
    }

    pub fn pointers(&self) -> Vec<Pointer> {
        self.tracker.borrow().pointers().to_vec()
    }

    pub fn frame_count(&self) -> u64 {
        self.frames.get()
    }

    pub fn frame_probe(&self) -> FrameProbe {
        FrameProbe(Rc::clone(&self.frames))
    }

    pub fn metrics(&self) -> Option<FieldMetrics> {
        self.resources
            .borrow()
            .as_ref()
            .map(|resources| FieldMetrics::analyze(&resources.simulation, self.frames.get()))
    }

    /// Renders the current dye field at the configured capture resolution.
    pub fn capture(&self) -> Result<RgbaImage> {
        let canvas = self.canvas.as_ref().ok_or(SplashError::NotMounted)?;
        let (width, height) = canvas.borrow().backing_size();

        let mut slot = self.resources.borrow_mut();
        let resources = slot.as_mut().ok_or(SplashError::NotMounted)?;
        let Resources {
            device, simulation, ..
        } = resources;
        Ok(export::capture(
            device,
            simulation.dye(),
            simulation.config(),
            width,
            height,
        ))
    }
}

impl Drop for SplashCursor {
    fn drop(&mut self) {
        // Callbacks still registered with the host outlive us; leave them inert.
        if self.state.get() == LifecycleState::Running {
            self.state.set(LifecycleState::Unmounted);
        }
        self.resources.borrow_mut().take();
    }
}
