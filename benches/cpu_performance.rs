use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use glam::{Vec2, Vec3};
use splashcursor::{
    Canvas, Capabilities, Device, Frame, Host, InputEvent, Simulation, SplashConfig, SplashCursor,
    render,
};

fn config(sim_resolution: u32, dye_resolution: u32) -> SplashConfig {
    SplashConfig {
        sim_resolution,
        dye_resolution,
        ..Default::default()
    }
}

fn seeded(config: &SplashConfig, device: &mut Device) -> Simulation {
    let mut sim = Simulation::new(config, 1280, 720);
    sim.splat(device, Vec2::splat(0.5), Vec2::new(600.0, 200.0), Vec3::new(0.15, 0.05, 0.0));
    for _ in 0..5 {
        sim.step(device, 1.0 / 60.0);
    }
    sim
}

fn benchmark_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("simulation_step");

    for (sim_res, dye_res) in [(32, 128), (64, 256), (128, 512)] {
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{sim_res}/{dye_res}")),
            &(sim_res, dye_res),
            |b, &(sim_res, dye_res)| {
                let mut device = Device::new(Capabilities::FULL);
                let mut sim = seeded(&config(sim_res, dye_res), &mut device);
                b.iter(|| sim.step(black_box(&mut device), black_box(1.0 / 60.0)));
            },
        );
    }
    group.finish();
}

fn benchmark_operations(c: &mut Criterion) {
    let mut group = c.benchmark_group("operations");
    let config = config(128, 512);
    let mut device = Device::new(Capabilities::FULL);
    let sim = seeded(&config, &mut device);

    group.bench_function("splat", |b| {
        let mut sim = Simulation::new(&config, 1280, 720);
        b.iter(|| {
            sim.splat(
                &mut device,
                black_box(Vec2::new(0.3, 0.6)),
                Vec2::new(60.0, 0.0),
                Vec3::new(0.0, 0.1, 0.15),
            )
        });
    });

    group.bench_function("display_shaded", |b| {
        let mut frame = Frame::new(1280, 720);
        b.iter(|| render::draw(&mut device, black_box(sim.dye()), &config, &mut frame));
    });

    let flat = SplashConfig {
        shading: false,
        ..config.clone()
    };
    group.bench_function("display_flat", |b| {
        let mut frame = Frame::new(1280, 720);
        b.iter(|| render::draw(&mut device, black_box(sim.dye()), &flat, &mut frame));
    });

    group.bench_function("resize", |b| {
        let mut sim = seeded(&config, &mut device);
        let mut wide = true;
        b.iter(|| {
            let (w, h) = if wide { (1280, 720) } else { (720, 1280) };
            wide = !wide;
            sim.resize(&mut device, w, h);
        });
    });

    group.finish();
}

fn benchmark_full_frame(c: &mut Criterion) {
    c.bench_function("mounted_frame_640x360", |b| {
        let mut host = Host::new(Canvas::new(640.0, 360.0, 1.0));
        let mut cursor = SplashCursor::new(config(64, 256)).with_seed(1);
        cursor.mount(&mut host).expect("mount on a capable canvas");
        host.input.dispatch(&InputEvent::PointerDown { x: 100.0, y: 180.0 });

        let mut frame = 0u64;
        b.iter(|| {
            frame += 1;
            let x = 100.0 + (frame % 400) as f32;
            host.input.dispatch(&InputEvent::PointerMove { x, y: 180.0 });
            host.frames.run_frame(frame as f64 / 60.0);
        });
        cursor.unmount(&mut host);
    });
}

criterion_group!(benches, benchmark_step, benchmark_operations, benchmark_full_frame);
criterion_main!(benches);
