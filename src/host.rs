//! The page side of the effect: input subscriptions and the animation frame
//! source a component registers with on mount.

use std::cell::RefCell;
use std::rc::Rc;

use crate::canvas::Canvas;
use crate::pointer::InputEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameRequestId(u64);

type InputListener = Box<dyn FnMut(&InputEvent)>;
type FrameCallback = Box<dyn FnMut(f64)>;

#[derive(Default)]
pub struct InputHub {
    next_id: u64,
    listeners: Vec<(SubscriptionId, InputListener)>,
}

impl InputHub {
    pub fn subscribe(&mut self, listener: InputListener) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, listener));
        id
    }

    /// Removes the listener registered under `id`; `false` if it was not found.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    pub fn dispatch(&mut self, event: &InputEvent) {
        for (_, listener) in &mut self.listeners {
            listener(event);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

/// Runs every registered callback once per display refresh.
#[derive(Default)]
pub struct FrameScheduler {
    next_id: u64,
    callbacks: Vec<(FrameRequestId, FrameCallback)>,
    frames_run: u64,
}

impl FrameScheduler {
    pub fn request(&mut self, callback: FrameCallback) -> FrameRequestId {
        let id = FrameRequestId(self.next_id);
        self.next_id += 1;
        self.callbacks.push((id, callback));
        id
    }

    pub fn cancel(&mut self, id: FrameRequestId) -> bool {
        let before = self.callbacks.len();
        self.callbacks.retain(|(request_id, _)| *request_id != id);
        self.callbacks.len() != before
    }

    /// Runs one frame; `now` is the frame timestamp in seconds.
    pub fn run_frame(&mut self, now: f64) {
        self.frames_run += 1;
        for (_, callback) in &mut self.callbacks {
            callback(now);
        }
    }

    pub fn pending(&self) -> usize {
        self.callbacks.len()
    }

    pub fn frames_run(&self) -> u64 {
        self.frames_run
    }
}

pub struct Host {
    pub input: InputHub,
    pub frames: FrameScheduler,
    canvas: Rc<RefCell<Canvas>>,
}

impl Host {
    pub fn new(canvas: Canvas) -> Self {
        Self {
            input: InputHub::default(),
            frames: FrameScheduler::default(),
            canvas: Rc::new(RefCell::new(canvas)),
        }
    }

    pub fn canvas(&self) -> &Rc<RefCell<Canvas>> {
        &self.canvas
    }
}
