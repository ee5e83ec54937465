//! Weighted random choice
//!
//! Every weighted draw in the generator (platform type, row size, ...) goes
//! through `pick_weighted` with the world's seeded RNG.

use rand::Rng;

/// A value with its relative weight
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Weighted<T> {
    pub value: T,
    pub weight: f32,
}

impl<T> Weighted<T> {
    pub const fn new(value: T, weight: f32) -> Self {
        Self { value, weight }
    }
}

/// Pick one value with probability proportional to its weight.
///
/// Non-positive weights never win. If rounding leaves the roll unconsumed the
/// last positively weighted item is returned. Returns `None` for an empty
/// slice or when no weight is positive.
pub fn pick_weighted<T: Copy, R: Rng + ?Sized>(items: &[Weighted<T>], rng: &mut R) -> Option<T> {
    let total: f32 = items.iter().map(|it| it.weight.max(0.0)).sum();
    if total <= 0.0 {
        return None;
    }

    let mut roll = rng.random::<f32>() * total;
    let mut last = None;
    for it in items.iter().filter(|it| it.weight > 0.0) {
        roll -= it.weight;
        last = Some(it.value);
        if roll < 0.0 {
            return last;
        }
    }
    last
}
