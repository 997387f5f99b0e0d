//! Entropy source for cancel-secrets and session salts (C10).
//!
//! Seeding is deliberately lazy: the source has no external randomness at
//! process start, so it waits to observe wall-clock jitter between the
//! first two events it is asked to produce a value for before it trusts
//! itself to be unpredictable. Before that point `next_u32` still returns
//! a value (the supervisor cannot simply refuse to hand out a cancel
//! secret), but it is not yet seeded from jitter.

use crate::clock::Clock;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Instant;

/// Produces per-worker cancellation secrets and transport salts.
pub trait EntropySource: Send + Sync {
    fn next_u32(&self) -> u32;
}

enum SeedState {
    WaitingFirst,
    WaitingSecond { first_seen: Instant, first_epoch_ms: u64 },
    Seeded(StdRng),
}

/// Jitter-seeded entropy source. One instance lives in the supervisor; each
/// spawned worker gets its own freshly-waiting instance (see
/// [`JitterEntropy::for_worker`]) so siblings never share a seed.
pub struct JitterEntropy<C: Clock> {
    clock: C,
    state: Mutex<SeedState>,
}

impl<C: Clock> JitterEntropy<C> {
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            state: Mutex::new(SeedState::WaitingFirst),
        }
    }

    /// A fresh, unseeded instance sharing this source's clock. Call this
    /// once in a newly spawned worker so it does not inherit the parent's
    /// seed (or lack thereof).
    pub fn for_worker(&self) -> Self {
        Self::new(self.clock.clone())
    }
}

impl<C: Clock> EntropySource for JitterEntropy<C> {
    fn next_u32(&self) -> u32 {
        let now = self.clock.now();
        let epoch_ms = self.clock.epoch_ms();
        let mut state = self.state.lock();
        match &*state {
            SeedState::WaitingFirst => {
                let provisional = (epoch_ms as u32) ^ 0x9E37_79B9;
                *state = SeedState::WaitingSecond {
                    first_seen: now,
                    first_epoch_ms: epoch_ms,
                };
                provisional
            }
            SeedState::WaitingSecond { first_seen, first_epoch_ms } => {
                let jitter_nanos = now.duration_since(*first_seen).as_nanos() as u64;
                let seed = jitter_nanos ^ first_epoch_ms.wrapping_mul(0x2545_F491_4F6C_DD1D);
                let mut rng = StdRng::seed_from_u64(seed);
                let value: u32 = rng.random();
                *state = SeedState::Seeded(rng);
                value
            }
            SeedState::Seeded(_) => {
                let SeedState::Seeded(rng) = &mut *state else {
                    unreachable!("matched Seeded above")
                };
                rng.random()
            }
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
/// Deterministic entropy source for tests: returns a fixed sequence, then
/// repeats the last value forever.
pub struct FakeEntropy {
    values: Mutex<Vec<u32>>,
}

#[cfg(any(test, feature = "test-support"))]
impl FakeEntropy {
    pub fn new(values: impl Into<Vec<u32>>) -> Self {
        let mut values = values.into();
        values.reverse();
        Self { values: Mutex::new(values) }
    }
}

#[cfg(any(test, feature = "test-support"))]
impl EntropySource for FakeEntropy {
    fn next_u32(&self) -> u32 {
        let mut values = self.values.lock();
        if values.len() > 1 {
            values.pop().unwrap_or_default()
        } else {
            values.first().copied().unwrap_or_default()
        }
    }
}

#[cfg(test)]
#[path = "entropy_tests.rs"]
mod tests;
