//! Demo runner integration tests: demos built from configuration and driven
//! through `DemoCore` against the simulation board.

use sonata_common::config::ConfigLoader;
use sonata_common::gpio::board::GpioBoard;
use sonata_common::gpio::config::{DemoConfig, DemoKind, GpioAppConfig};
use sonata_gpio::{
    BoardRegistry, DemoCore, DemoError, LedRegistry, QuotaAllocator, RegistryError,
    SimulatedBoard, create_demo,
};
use std::sync::{Arc, mpsc};
use std::sync::atomic::Ordering;
use std::thread;
use std::time::Duration;

fn setup() -> (Arc<SimulatedBoard>, Arc<LedRegistry>) {
    let board = Arc::new(SimulatedBoard::new(8));
    let registry = Arc::new(LedRegistry::new(
        board.clone(),
        Arc::new(QuotaAllocator::new(1024)),
    ));
    (board, registry)
}

fn demo_config(kind: DemoKind, cycles: u64) -> DemoConfig {
    DemoConfig {
        kind,
        period_ms: 1,
        cycles,
        ..Default::default()
    }
}

/// Test: every demo runs its cycles and hands back all LEDs.
#[test]
fn every_demo_runs_and_releases() {
    for kind in DemoKind::ALL {
        let (_, registry) = setup();
        let config = demo_config(kind, 16);
        let mut demo = create_demo(&config, registry.board().clone(), registry.clone());
        let mut core = DemoCore::new(&config);

        core.run(demo.as_mut())
            .unwrap_or_else(|e| panic!("{kind} failed: {e}"));
        assert_eq!(core.stats().steps, 16, "{kind}");
        assert_eq!(registry.taken_mask(), 0, "{kind}");
        assert_eq!(registry.snapshot().allocator_used, 0, "{kind}");
    }
}

/// Test: blinky_dynamic leaves LED 7 lit after an odd number of steps.
#[test]
fn blinky_dynamic_blinks_led_seven() {
    let (board, registry) = setup();

    let config = demo_config(DemoKind::BlinkyDynamic, 3);
    let mut demo = create_demo(&config, board.clone(), registry.clone());
    DemoCore::new(&config).run(demo.as_mut()).unwrap();
    assert_eq!(board.leds(), 0b1000_0000);
    assert_eq!(board.write_count(), 3);

    let config = demo_config(DemoKind::BlinkyDynamic, 1);
    let mut demo = create_demo(&config, board.clone(), registry);
    DemoCore::new(&config).run(demo.as_mut()).unwrap();
    assert_eq!(board.leds(), 0);
}

/// Test: led_walk_dynamic lights every LED after one full pass.
#[test]
fn led_walk_dynamic_full_pass() {
    let (board, registry) = setup();
    let config = demo_config(DemoKind::LedWalkDynamic, 8);
    let mut demo = create_demo(&config, board.clone(), registry.clone());

    DemoCore::new(&config).run(demo.as_mut()).unwrap();
    assert_eq!(board.leds(), 0xFF);
    assert_eq!(registry.snapshot().leds_on, (0..8).collect::<Vec<u8>>());
}

/// Test: a dynamic demo whose LED is held elsewhere fails at start.
#[test]
fn dynamic_demo_fails_when_led_held() {
    let (board, registry) = setup();
    let held = registry.acquire(7).unwrap();

    let config = demo_config(DemoKind::BlinkyDynamic, 4);
    let mut demo = create_demo(&config, board, registry.clone());
    let mut core = DemoCore::new(&config);

    assert_eq!(
        core.run(demo.as_mut()),
        Err(DemoError::Registry(RegistryError::AlreadyTaken(7)))
    );
    assert_eq!(core.stats().steps, 0);
    assert!(registry.is_taken(7));
    registry.release(&held);
}

/// Test: clearing the running flag stops an unlimited demo and releases its
/// LEDs.
#[test]
fn running_flag_stops_unlimited_demo() {
    let (_, registry) = setup();
    let config = demo_config(DemoKind::LedWalkDynamic, 0);
    let mut demo = create_demo(&config, registry.board().clone(), registry.clone());
    let mut core = DemoCore::new(&config);
    let running = core.running_flag();

    let runner = thread::spawn(move || {
        let result = core.run(demo.as_mut());
        (result, core.stats())
    });

    // Wait for the demo to take its LEDs before asking it to stop.
    for _ in 0..500 {
        if registry.taken_mask() == 0xFF {
            break;
        }
        thread::sleep(Duration::from_millis(1));
    }
    running.store(false, Ordering::SeqCst);

    let (result, _) = runner.join().expect("runner panicked");
    assert!(result.is_ok());
    assert_eq!(registry.taken_mask(), 0);
}

/// Test: a shutdown requested before the loop starts is not lost.
#[test]
fn shutdown_requested_before_run_returns() {
    let (board, registry) = setup();
    let config = demo_config(DemoKind::BlinkyRaw, 0);
    let mut demo = create_demo(&config, board.clone(), registry);
    let mut core = DemoCore::new(&config);
    core.running_flag().store(false, Ordering::SeqCst);

    let (done_tx, done_rx) = mpsc::channel();
    thread::spawn(move || {
        let result = core.run(demo.as_mut());
        let _ = done_tx.send((result, core.stats()));
    });

    let (result, stats) = done_rx
        .recv_timeout(Duration::from_secs(5))
        .expect("demo loop ignored the cleared running flag");
    assert!(result.is_ok());
    assert_eq!(stats.steps, 0);
    assert_eq!(board.leds(), 0);
}

/// Test: config file to running demo, the way the binary wires it.
#[test]
fn config_file_drives_demo() {
    let config = GpioAppConfig::from_toml(
        r#"
        [shared]
        service_name = "demo-test"

        [gpio]
        board = "simulation"
        led_count = 4

        [demo]
        kind = "led_walk_raw"
        period_ms = 1
        led_index = 0
        cycles = 5
        "#,
    )
    .unwrap();
    config.validate().unwrap();

    let board = BoardRegistry::with_builtin_boards()
        .create_board(&config.gpio.board, &config.gpio)
        .unwrap();
    assert_eq!(board.led_count(), 4);

    let registry = Arc::new(LedRegistry::new(
        board.clone(),
        Arc::new(QuotaAllocator::new(config.gpio.malloc_quota)),
    ));
    let mut demo = create_demo(&config.demo, board.clone(), registry);
    let mut core = DemoCore::new(&config.demo);
    core.run(demo.as_mut()).unwrap();

    // Walk from LED 3 down: 3, 2, 1, 0, then 3 again switches it off.
    assert!(!board.led(3));
    assert!(board.led(2));
    assert!(board.led(1));
    assert!(board.led(0));
}
