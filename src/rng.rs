//! Deterministic RNG management.
//!
//! Thread-local storage that can be seeded for reproducible bouts, plus a
//! forced-roll queue so tests can pin the outcome of specific dice without
//! reaching into the resolution pipeline.

use rand::prelude::*;
use std::cell::RefCell;
use std::collections::VecDeque;

thread_local! {
    static RNG: RefCell<Option<StdRng>> = const { RefCell::new(None) };
    static CURRENT_SEED: RefCell<u64> = const { RefCell::new(0) };
    // (sides, value) pairs consumed by the next matching die
    static FORCED_ROLLS: RefCell<VecDeque<(u32, u32)>> = const { RefCell::new(VecDeque::new()) };
}

/// Seed the thread-local RNG. Every subsequent roll on this thread is a pure
/// function of the seed and the roll sequence.
pub fn seed_rng(seed: u64) {
    RNG.with(|rng| {
        *rng.borrow_mut() = Some(StdRng::seed_from_u64(seed));
    });
    CURRENT_SEED.with(|s| {
        *s.borrow_mut() = seed;
    });
}

/// The seed most recently passed to [`seed_rng`].
pub fn current_seed() -> u64 {
    CURRENT_SEED.with(|s| *s.borrow())
}

/// Drop any seeded RNG and pending forced rolls.
pub fn clear_rng() {
    RNG.with(|rng| {
        *rng.borrow_mut() = None;
    });
    clear_forced_rolls();
}

/// Force the next roll of an `sides`-sided die to come up `value`.
///
/// Values outside 1..=sides are honored as-is; tests use this to synthesize
/// outcomes (a fixed damage total) that fair dice would make awkward.
pub fn force_roll(sides: u32, value: u32) {
    FORCED_ROLLS.with(|f| {
        f.borrow_mut().push_back((sides, value));
    });
}

/// Queue several forced rolls of the same die size.
pub fn force_rolls(sides: u32, values: &[u32]) {
    for &v in values {
        force_roll(sides, v);
    }
}

pub fn clear_forced_rolls() {
    FORCED_ROLLS.with(|f| {
        f.borrow_mut().clear();
    });
}

/// Roll one die, honoring the forced-roll queue first.
pub fn roll_die(sides: u32) -> u32 {
    let forced = FORCED_ROLLS.with(|f| {
        let mut queue = f.borrow_mut();
        if let Some(pos) = queue.iter().position(|&(s, _)| s == sides) {
            return queue.remove(pos).map(|(_, v)| v);
        }
        None
    });
    if let Some(val) = forced {
        return val;
    }
    let mut rng = handle();
    rng.gen_range(1..=sides)
}

/// Uniform sample in `[0, 1)`; the `context.random()` surface.
pub fn random_unit() -> f64 {
    let mut rng = handle();
    rng.gen::<f64>()
}

/// A handle over the thread-local RNG that always advances shared state, so
/// seeded runs stay reproducible no matter which call site rolls next.
pub struct RngHandle;

impl RngCore for RngHandle {
    fn next_u32(&mut self) -> u32 {
        RNG.with(|rng_opt| match rng_opt.borrow_mut().as_mut() {
            Some(rng) => rng.next_u32(),
            None => thread_rng().next_u32(),
        })
    }

    fn next_u64(&mut self) -> u64 {
        RNG.with(|rng_opt| match rng_opt.borrow_mut().as_mut() {
            Some(rng) => rng.next_u64(),
            None => thread_rng().next_u64(),
        })
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        RNG.with(|rng_opt| match rng_opt.borrow_mut().as_mut() {
            Some(rng) => rng.fill_bytes(dest),
            None => thread_rng().fill_bytes(dest),
        })
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        RNG.with(|rng_opt| match rng_opt.borrow_mut().as_mut() {
            Some(rng) => rng.try_fill_bytes(dest),
            None => thread_rng().try_fill_bytes(dest),
        })
    }
}

pub fn handle() -> RngHandle {
    RngHandle
}
