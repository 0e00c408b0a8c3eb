//! LED registry integration tests: ownership properties over every index,
//! the blink scenario, stale and foreign handles, and racing acquirers.

use sonata_common::gpio::bits::led_bit;
use sonata_common::gpio::board::GpioBoard;
use sonata_gpio::registry::HANDLE_ALLOCATION_SIZE;
use sonata_gpio::{
    AllocatorId, LedRegistry, QuotaAllocator, RegistryError, SimulatedBoard, TokenAllocator,
};
use std::sync::{Arc, Barrier};
use std::thread;

fn setup(leds: u8) -> (Arc<SimulatedBoard>, Arc<LedRegistry>) {
    let board = Arc::new(SimulatedBoard::new(leds));
    let registry = Arc::new(LedRegistry::new(
        board.clone(),
        Arc::new(QuotaAllocator::new(4096)),
    ));
    (board, registry)
}

/// Test: every free index can be acquired, exactly once.
#[test]
fn acquire_succeeds_iff_free() {
    let (_, reg) = setup(8);
    let mut handles = Vec::new();

    for i in 0..8 {
        let handle = reg.acquire(i).expect("free LED");
        assert_eq!(handle.index(), i);
        assert_eq!(reg.acquire(i), Err(RegistryError::AlreadyTaken(i)));
        handles.push(handle);
    }
    assert_eq!(reg.taken_mask(), 0xFF);
    assert_eq!(reg.available(), 0);

    for handle in &handles {
        reg.release(handle);
    }
    assert_eq!(reg.taken_mask(), 0);
}

/// Test: indices at or past the pool size are OutOfRange, not AlreadyTaken.
#[test]
fn acquire_out_of_range() {
    let (_, reg) = setup(8);
    for i in [8u8, 9, 27, 31, 200, u8::MAX] {
        assert_eq!(
            reg.acquire(i),
            Err(RegistryError::OutOfRange { index: i, count: 8 })
        );
    }
    assert_eq!(reg.taken_mask(), 0);
    assert_eq!(reg.snapshot().allocator_used, 0);
}

/// Test: release then acquire frees the index again, for every index.
#[test]
fn release_round_trip() {
    let (_, reg) = setup(8);
    for i in 0..8 {
        let handle = reg.acquire(i).unwrap();
        reg.release(&handle);
        assert!(!reg.is_taken(i));
        let again = reg.acquire(i).expect("index free after release");
        assert_ne!(again, handle);
        reg.release(&again);
    }
}

/// Test: a released handle can neither toggle nor release.
#[test]
fn released_handle_is_invalid() {
    let (board, reg) = setup(8);
    for i in 0..8 {
        let handle = reg.acquire(i).unwrap();
        reg.try_release(&handle).unwrap();

        let before = board.output();
        assert_eq!(reg.try_toggle(&handle), Err(RegistryError::InvalidHandle));
        assert!(!reg.toggle(&handle));
        assert_eq!(reg.try_release(&handle), Err(RegistryError::InvalidHandle));
        assert_eq!(reg.set(&handle, true), Err(RegistryError::InvalidHandle));
        assert_eq!(board.output(), before);
    }
}

/// Scenario on an 8-LED pool: blink LED 7, release, reuse.
#[test]
fn blink_release_reacquire_scenario() {
    let (board, reg) = setup(8);

    let h = reg.acquire(7).unwrap();
    assert!(reg.toggle(&h));
    assert_eq!(board.output(), led_bit(7));
    assert!(board.led(7));

    reg.release(&h);
    assert!(!reg.toggle(&h));
    assert!(board.led(7));

    let fresh = reg.acquire(7).expect("LED 7 free after release");
    assert!(reg.toggle(&fresh));
    assert!(!board.led(7));
    reg.release(&fresh);
}

/// Scenario: two acquires of LED 3 in a row.
#[test]
fn double_acquire_scenario() {
    let (_, reg) = setup(8);
    let first = reg.acquire(3);
    assert!(first.is_ok());
    assert_eq!(reg.acquire(3), Err(RegistryError::AlreadyTaken(3)));
}

/// Scenario: LED 8 on an 8-LED pool.
#[test]
fn out_of_range_scenario() {
    let (_, reg) = setup(8);
    assert!(matches!(
        reg.acquire(8),
        Err(RegistryError::OutOfRange { index: 8, .. })
    ));
}

/// Test: a handle outlived by several release/acquire cycles stays dead.
#[test]
fn stale_handle_after_many_generations() {
    let (_, reg) = setup(8);
    let stale = reg.acquire(4).unwrap();
    reg.release(&stale);

    for _ in 0..100 {
        let h = reg.acquire(4).unwrap();
        assert_eq!(reg.try_toggle(&stale), Err(RegistryError::InvalidHandle));
        reg.release(&h);
    }

    let live = reg.acquire(4).unwrap();
    reg.release(&stale);
    assert!(reg.is_taken(4));
    assert!(reg.toggle(&live));
}

/// Test: handles from one registry never act on another.
#[test]
fn handles_are_bound_to_their_registry() {
    let (board_a, a) = setup(8);
    let (board_b, b) = setup(8);

    let ha = a.acquire(0).unwrap();
    let hb = b.acquire(0).unwrap();

    assert_eq!(b.try_toggle(&ha), Err(RegistryError::InvalidHandle));
    assert_eq!(a.try_toggle(&hb), Err(RegistryError::InvalidHandle));
    assert_eq!(board_a.output(), 0);
    assert_eq!(board_b.output(), 0);

    assert!(a.toggle(&ha));
    assert!(b.toggle(&hb));
}

/// Test: raw writes to unowned LEDs are visible but owned LEDs stay under
/// handle control.
#[test]
fn raw_writes_coexist_with_registry() {
    let (board, reg) = setup(8);
    let h = reg.acquire(2).unwrap();

    board.led_toggle(5);
    assert!(reg.toggle(&h));

    let snap = reg.snapshot();
    assert_eq!(snap.taken, vec![2]);
    assert_eq!(snap.leds_on, vec![2, 5]);
}

/// Test: running out of allocator quota reports OutOfMemory and leaves the
/// LED free.
#[test]
fn quota_exhaustion_fails_closed() {
    let board = Arc::new(SimulatedBoard::new(8));
    let allocator = Arc::new(QuotaAllocator::new(3 * HANDLE_ALLOCATION_SIZE));
    let reg = LedRegistry::new(board, allocator);

    let held: Vec<_> = (0..3).map(|i| reg.acquire(i).unwrap()).collect();
    assert!(matches!(reg.acquire(3), Err(RegistryError::OutOfMemory(_))));
    assert!(!reg.is_taken(3));
    assert_eq!(reg.taken_mask(), 0b111);

    reg.release(&held[0]);
    assert!(reg.acquire(3).is_ok());
}

/// Test: a forged allocation handed to the allocator cannot free quota for
/// another handle.
#[test]
fn forged_free_does_not_raise_quota() {
    let board = Arc::new(SimulatedBoard::new(8));
    let allocator = Arc::new(QuotaAllocator::new(HANDLE_ALLOCATION_SIZE));
    let reg = LedRegistry::new(board, allocator.clone());

    let _h0 = reg.acquire(0).unwrap();
    allocator.free(AllocatorId::new().issue(HANDLE_ALLOCATION_SIZE));
    assert_eq!(allocator.used(), HANDLE_ALLOCATION_SIZE);

    assert!(matches!(reg.acquire(1), Err(RegistryError::OutOfMemory(_))));
    assert_eq!(reg.taken_mask(), 0b1);
}

/// Test: threads racing for one LED get exactly one handle.
#[test]
fn concurrent_acquire_single_winner() {
    const THREADS: usize = 8;

    for _ in 0..50 {
        let (_, reg) = setup(8);
        let barrier = Arc::new(Barrier::new(THREADS));

        let threads: Vec<_> = (0..THREADS)
            .map(|_| {
                let reg = Arc::clone(&reg);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    reg.acquire(3)
                })
            })
            .collect();
        let results: Vec<_> = threads
            .into_iter()
            .map(|t| t.join().expect("thread panicked"))
            .collect();

        let winners = results.iter().filter(|r| r.is_ok()).count();
        let losers = results
            .iter()
            .filter(|r| matches!(r, Err(RegistryError::AlreadyTaken(3))))
            .count();
        assert_eq!(winners, 1);
        assert_eq!(losers, THREADS - 1);
        assert_eq!(reg.snapshot().allocator_used, HANDLE_ALLOCATION_SIZE);
    }
}

/// Test: concurrent owners of distinct LEDs toggle without interfering.
#[test]
fn concurrent_owners_distinct_leds() {
    let (board, reg) = setup(8);

    let threads: Vec<_> = (0..8u8)
        .map(|i| {
            let reg = Arc::clone(&reg);
            thread::spawn(move || {
                let h = reg.acquire(i).expect("distinct LED");
                // Odd number of toggles leaves the LED on.
                for _ in 0..101 {
                    assert!(reg.toggle(&h));
                }
                h
            })
        })
        .collect();

    let handles: Vec<_> = threads
        .into_iter()
        .map(|t| t.join().expect("thread panicked"))
        .collect();

    assert_eq!(board.leds(), 0xFF);
    for h in &handles {
        reg.release(h);
    }
    assert_eq!(reg.taken_mask(), 0);
}
