//! Uniform selection of one item from a stream of unknown length
//!
//! Implements reservoir sampling with a reservoir of one: the `n`th item
//! offered replaces the current pick with probability `1/n`, which leaves
//! every item of an `N`-item stream selected with probability `1/N` once the
//! stream is exhausted. Only the current pick and a counter are kept, so
//! memory use does not depend on the length of the stream.
//!
//! The random number generator is passed in by the caller. The binary seeds
//! one generator from OS entropy per invocation; tests use a fixed seed.
//!
//! # Examples
//!
//! ```
//! use libpicbot::selector::select_one;
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let mut rng = StdRng::seed_from_u64(7);
//! let pick = select_one(["a", "b", "c"], &mut rng).unwrap();
//! assert!((1..=3).contains(&pick.position));
//! ```

use rand::Rng;

/// The winning item of a selection run and its 1-based position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection<T> {
    pub item: T,
    pub position: usize,
}

/// Single-slot reservoir that items are offered to one at a time.
#[derive(Debug)]
pub struct Reservoir<T> {
    seen: usize,
    pick: Option<Selection<T>>,
}

impl<T> Default for Reservoir<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Reservoir<T> {
    pub fn new() -> Self {
        Self {
            seen: 0,
            pick: None,
        }
    }

    /// Offer the next item of the stream.
    pub fn offer<R: Rng + ?Sized>(&mut self, item: T, rng: &mut R) {
        self.seen += 1;
        if rng.gen_range(0..self.seen) == 0 {
            self.pick = Some(Selection {
                item,
                position: self.seen,
            });
        }
    }

    /// Number of items offered so far.
    pub fn seen(&self) -> usize {
        self.seen
    }

    /// The current pick, or `None` if nothing has been offered.
    pub fn into_selection(self) -> Option<Selection<T>> {
        self.pick
    }
}

/// Pick one item uniformly at random from `items` in a single pass.
///
/// Returns `None` for an empty sequence.
pub fn select_one<I, R>(items: I, rng: &mut R) -> Option<Selection<I::Item>>
where
    I: IntoIterator,
    R: Rng + ?Sized,
{
    let mut reservoir = Reservoir::new();
    for item in items {
        reservoir.offer(item, rng);
    }
    reservoir.into_selection()
}

/// Like [`select_one`], for streams whose reads can fail (e.g. `BufRead::lines`).
///
/// Stops at the first error.
pub fn try_select_one<I, T, E, R>(items: I, rng: &mut R) -> Result<Option<Selection<T>>, E>
where
    I: IntoIterator<Item = Result<T, E>>,
    R: Rng + ?Sized,
{
    let mut reservoir = Reservoir::new();
    for item in items {
        reservoir.offer(item?, rng);
    }
    Ok(reservoir.into_selection())
}
