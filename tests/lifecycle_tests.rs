use glam::Vec3;
use splashcursor::config::FALLBACK_DYE_RESOLUTION;
use splashcursor::cursor::{MAX_FRAME_DT, frame_delta};
use splashcursor::desktop::WINDOW_DYE_RESOLUTION;
use splashcursor::{
    Canvas, Capabilities, Host, InputEvent, LifecycleState, ProgramKind, SplashApp, SplashConfig,
    SplashCursor, SplashError, Touch,
};

fn small_config() -> SplashConfig {
    SplashConfig {
        sim_resolution: 16,
        dye_resolution: 32,
        capture_resolution: 16,
        pressure_iterations: 5,
        ..Default::default()
    }
}

fn mounted(width: f32, height: f32) -> (Host, SplashCursor) {
    let mut host = Host::new(Canvas::new(width, height, 1.0));
    let mut cursor = SplashCursor::new(small_config()).with_seed(1);
    cursor.mount(&mut host).unwrap();
    (host, cursor)
}

#[test]
fn test_mount_registers_with_host() {
    let (host, cursor) = mounted(320.0, 240.0);
    assert_eq!(cursor.state(), LifecycleState::Running);
    assert_eq!(host.input.listener_count(), 1);
    assert_eq!(host.frames.pending(), 1);
    assert_eq!(host.canvas().borrow().backing_size(), (320, 240));
}

#[test]
fn test_press_then_move_updates_pointer() {
    let (mut host, cursor) = mounted(1000.0, 800.0);

    host.input.dispatch(&InputEvent::PointerDown { x: 500.0, y: 400.0 });
    host.input.dispatch(&InputEvent::PointerMove { x: 600.0, y: 400.0 });

    let pointers = cursor.pointers();
    let pointer = &pointers[0];
    assert!(pointer.down);
    assert!(pointer.moved);
    assert!((pointer.texcoord.x - 0.6).abs() < 1e-5);
    assert!((pointer.texcoord.y - 0.5).abs() < 1e-5);
    assert!((pointer.delta.x - 0.1).abs() < 1e-5);
    assert_eq!(pointer.delta.y, 0.0);
    assert_ne!(pointer.color, Vec3::ZERO);
}

#[test]
fn test_frame_consumes_motion_and_draws() {
    let (mut host, cursor) = mounted(200.0, 150.0);

    host.input.dispatch(&InputEvent::PointerDown { x: 100.0, y: 75.0 });
    host.input.dispatch(&InputEvent::PointerMove { x: 120.0, y: 80.0 });
    host.frames.run_frame(0.0);

    assert!(!cursor.pointers()[0].moved);
    assert_eq!(cursor.frame_count(), 1);

    let canvas = host.canvas().borrow();
    assert!(canvas.frame().pixels().iter().any(|p| p[3] > 0));

    let metrics = cursor.metrics().unwrap();
    assert!(metrics.total_dye > 0.0);
    assert_eq!(metrics.frame, 1);
}

#[test]
fn test_no_frames_after_unmount() {
    let (mut host, mut cursor) = mounted(200.0, 150.0);
    let probe = cursor.frame_probe();

    for frame in 0..3 {
        host.frames.run_frame(frame as f64 / 60.0);
    }
    assert_eq!(probe.get(), 3);

    cursor.unmount(&mut host);
    assert_eq!(cursor.state(), LifecycleState::Unmounted);
    assert_eq!(host.frames.pending(), 0);
    assert_eq!(host.input.listener_count(), 0);
    assert!(cursor.metrics().is_none());

    for frame in 3..6 {
        host.frames.run_frame(frame as f64 / 60.0);
    }
    assert_eq!(probe.get(), 3);
    assert_eq!(host.frames.frames_run(), 6);
}

#[test]
fn test_input_ignored_after_unmount() {
    let (mut host, mut cursor) = mounted(200.0, 150.0);
    cursor.unmount(&mut host);

    host.input.dispatch(&InputEvent::PointerDown { x: 10.0, y: 10.0 });
    assert!(!cursor.pointers()[0].down);
}

#[test]
fn test_dropped_cursor_leaves_callbacks_inert() {
    let (mut host, cursor) = mounted(200.0, 150.0);
    let probe = cursor.frame_probe();
    drop(cursor);

    host.input.dispatch(&InputEvent::PointerDown { x: 10.0, y: 10.0 });
    host.frames.run_frame(0.0);
    assert_eq!(probe.get(), 0);
}

#[test]
fn test_remount_after_unmount() {
    let (mut host, mut cursor) = mounted(200.0, 150.0);
    host.frames.run_frame(0.0);
    cursor.unmount(&mut host);

    cursor.mount(&mut host).unwrap();
    assert_eq!(cursor.state(), LifecycleState::Running);
    assert_eq!(cursor.frame_count(), 0);
    assert_eq!(host.frames.pending(), 1);
    assert_eq!(host.input.listener_count(), 1);
}

#[test]
fn test_second_mount_is_ignored() {
    let (mut host, mut cursor) = mounted(200.0, 150.0);
    cursor.mount(&mut host).unwrap();
    assert_eq!(host.frames.pending(), 1);
    assert_eq!(host.input.listener_count(), 1);
}

#[test]
fn test_backing_store_resizes_only_when_size_changes() {
    let mut canvas = Canvas::new(300.0, 200.0, 2.0);
    assert!(canvas.sync_backing_store());
    assert!(!canvas.sync_backing_store());
    assert_eq!(canvas.backing_size(), (600, 400));
    assert_eq!(canvas.backing_store_resizes(), 1);

    let (mut host, _cursor) = mounted(300.0, 200.0);
    for frame in 0..4 {
        host.frames.run_frame(frame as f64 / 60.0);
    }
    assert_eq!(host.canvas().borrow().backing_store_resizes(), 1);

    host.canvas().borrow_mut().set_client_size(400.0, 200.0);
    host.frames.run_frame(4.0 / 60.0);
    host.frames.run_frame(5.0 / 60.0);

    let canvas = host.canvas().borrow();
    assert_eq!(canvas.backing_store_resizes(), 2);
    assert_eq!(canvas.backing_size(), (400, 200));
    assert_eq!(canvas.frame().width(), 400);
}

#[test]
fn test_missing_context_fails_without_rendering() {
    let mut host = Host::new(Canvas::new(200.0, 150.0, 1.0).with_capabilities(None));
    let mut cursor = SplashCursor::new(small_config());
    let probe = cursor.frame_probe();

    let err = cursor.mount(&mut host).unwrap_err();
    assert!(matches!(err, SplashError::ContextUnavailable));
    assert_eq!(cursor.state(), LifecycleState::Failed);
    assert_eq!(host.input.listener_count(), 0);
    assert_eq!(host.frames.pending(), 0);

    host.frames.run_frame(0.0);
    assert_eq!(probe.get(), 0);
    assert_eq!(host.canvas().borrow().backing_size(), (0, 0));

    assert!(cursor.mount(&mut host).is_err());
    cursor.unmount(&mut host);
    assert_eq!(cursor.state(), LifecycleState::Failed);
}

#[test]
fn test_limited_device_runs_downgraded() {
    let canvas = Canvas::new(64.0, 64.0, 1.0).with_capabilities(Some(Capabilities {
        float_textures: true,
        linear_filtering: false,
    }));
    let mut host = Host::new(canvas);
    let mut cursor = SplashCursor::new(small_config()).with_seed(3);
    cursor.mount(&mut host).unwrap();

    let effective = cursor.effective_config().unwrap();
    assert_eq!(effective.dye_resolution, FALLBACK_DYE_RESOLUTION);
    assert!(!effective.shading);
    assert_eq!(cursor.config().dye_resolution, 32);

    host.input.dispatch(&InputEvent::PointerDown { x: 32.0, y: 32.0 });
    host.frames.run_frame(0.0);
    assert_eq!(cursor.frame_count(), 1);
}

#[test]
fn test_instances_do_not_share_input() {
    let mut host = Host::new(Canvas::new(200.0, 150.0, 1.0));
    let mut first = SplashCursor::new(small_config()).with_seed(1);
    let mut second = SplashCursor::new(small_config()).with_seed(2);
    first.mount(&mut host).unwrap();
    second.mount(&mut host).unwrap();

    host.input.dispatch(&InputEvent::PointerDown { x: 50.0, y: 50.0 });
    assert!(first.pointers()[0].down);
    assert!(second.pointers()[0].down);

    first.unmount(&mut host);
    assert_eq!(host.input.listener_count(), 1);
    assert_eq!(host.frames.pending(), 1);

    host.input.dispatch(&InputEvent::PointerMove { x: 80.0, y: 50.0 });
    assert!(second.pointers()[0].moved);
    assert!(!first.pointers()[0].moved);

    host.frames.run_frame(0.0);
    assert_eq!(first.frame_count(), 0);
    assert_eq!(second.frame_count(), 1);
}

#[test]
fn test_multi_touch_slots() {
    let mut host = Host::new(Canvas::new(200.0, 150.0, 1.0));
    let mut cursor = SplashCursor::new(small_config())
        .with_pointer_capacity(2)
        .with_seed(4);
    cursor.mount(&mut host).unwrap();

    let touches = vec![
        Touch { id: 1, x: 20.0, y: 20.0 },
        Touch { id: 2, x: 120.0, y: 90.0 },
        Touch { id: 3, x: 180.0, y: 140.0 },
    ];
    host.input.dispatch(&InputEvent::TouchStart(touches));

    let pointers = cursor.pointers();
    assert_eq!(pointers.len(), 2);
    assert_eq!(pointers[0].id, 1);
    assert_eq!(pointers[1].id, 2);
}

#[test]
fn test_hover_without_press_leaves_dye() {
    let mut host = Host::new(Canvas::new(200.0, 150.0, 1.0));
    let config = SplashConfig {
        color_update_speed: 0.0,
        ..small_config()
    };
    let mut cursor = SplashCursor::new(config).with_seed(6);
    cursor.mount(&mut host).unwrap();

    for frame in 0..20 {
        host.input.dispatch(&InputEvent::PointerMove {
            x: 50.0 + 5.0 * frame as f32,
            y: 75.0,
        });
        host.frames.run_frame(frame as f64 / 60.0);
    }

    assert!(!cursor.pointers()[0].down);
    assert_ne!(cursor.pointers()[0].color, Vec3::ZERO);
    let metrics = cursor.metrics().unwrap();
    assert!(metrics.total_dye > 0.0, "hovering left no dye");
    assert!(metrics.max_velocity > 0.0);
}

#[test]
fn test_rejected_display_mounts_and_draws_nothing() {
    let canvas = Canvas::new(200.0, 150.0, 1.0).with_rejected_programs([ProgramKind::Display]);
    let mut host = Host::new(canvas);
    let mut cursor = SplashCursor::new(small_config()).with_seed(2);
    cursor.mount(&mut host).unwrap();

    host.input.dispatch(&InputEvent::PointerDown { x: 100.0, y: 75.0 });
    host.input.dispatch(&InputEvent::PointerMove { x: 130.0, y: 75.0 });
    host.frames.run_frame(0.0);
    host.frames.run_frame(1.0 / 60.0);

    assert_eq!(cursor.state(), LifecycleState::Running);
    assert_eq!(cursor.frame_count(), 2);
    assert!(cursor.metrics().unwrap().total_dye > 0.0);
    let canvas = host.canvas().borrow();
    assert!(canvas.frame().pixels().iter().all(|p| *p == [0, 0, 0, 0]));
}

#[test]
fn test_frame_delta_is_clamped() {
    assert_eq!(frame_delta(None, 12.0), MAX_FRAME_DT);
    assert_eq!(frame_delta(Some(0.0), 1.0), MAX_FRAME_DT);
    assert_eq!(frame_delta(Some(1.0), 0.5), 0.0);
    assert_eq!(frame_delta(Some(2.0), 2.0), 0.0);

    let dt = frame_delta(Some(1.0), 1.01);
    assert!((dt - 0.01).abs() < 1e-5);
}

#[test]
fn test_pixel_ratio_change_resizes_backing_store() {
    let (mut host, _cursor) = mounted(300.0, 200.0);
    host.frames.run_frame(0.0);
    assert_eq!(host.canvas().borrow().backing_store_resizes(), 1);

    host.canvas().borrow_mut().set_pixel_ratio(2.0);
    host.frames.run_frame(1.0 / 60.0);
    host.frames.run_frame(2.0 / 60.0);

    let canvas = host.canvas().borrow();
    assert_eq!(canvas.backing_size(), (600, 400));
    assert_eq!(canvas.backing_store_resizes(), 2);
    assert_eq!(canvas.viewport().pixel_ratio, 2.0);
}

#[test]
fn test_window_config_lowers_dye_resolution() {
    let config = SplashApp::window_config();
    assert_eq!(config.dye_resolution, WINDOW_DYE_RESOLUTION);
    assert!(config.dye_resolution < SplashConfig::default().dye_resolution);
    assert_eq!(config.sim_resolution, SplashConfig::default().sim_resolution);
    assert!(config.validate().is_ok());
}
