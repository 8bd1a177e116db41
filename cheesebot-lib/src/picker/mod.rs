//! Random selection with bounded anti-repetition.
//!
//! [`NoRepeatPicker`] remembers recent picks and refuses to hand them out
//! again, while never blocking more than half of the current candidates.
//! [`Picker`] binds one to an [`ItemSource`] that is re-queried on every pick.

mod sources;

use rand::rngs::StdRng;
use rand::seq::IteratorRandom;
use rand::SeedableRng;
use std::collections::{BTreeSet, VecDeque};

pub use sources::{Phrases, SoundEffects};

/// Picks items uniformly while suppressing recent repeats.
pub struct NoRepeatPicker<T> {
    window: VecDeque<T>,
    rng: StdRng,
}

impl<T: Ord + Clone> NoRepeatPicker<T> {
    /// Create a picker seeded from the operating system.
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Create a picker with a fixed seed.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            window: VecDeque::new(),
            rng,
        }
    }

    /// Recently picked items, oldest first.
    pub fn window(&self) -> impl Iterator<Item = &T> {
        self.window.iter()
    }

    /// Pick one of `candidates`, or `None` when there are none.
    ///
    /// Before choosing, the oldest `ceil(w - n / 2)` recency entries are
    /// forgotten (`w` window length, `n` distinct candidates), so at most
    /// half of the candidates are ever excluded.
    pub fn pick<I>(&mut self, candidates: I) -> Option<T>
    where
        I: IntoIterator<Item = T>,
    {
        let candidates: BTreeSet<T> = candidates.into_iter().collect();
        if candidates.is_empty() {
            return None;
        }

        let evict = self.window.len().saturating_sub(candidates.len() / 2);
        self.window.drain(..evict);

        let item = candidates
            .iter()
            .filter(|item| !self.window.contains(*item))
            .choose(&mut self.rng)
            .cloned()?;

        self.window.push_back(item.clone());
        Some(item)
    }
}

impl<T: Ord + Clone> Default for NoRepeatPicker<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Provider of the full candidate set at pick time.
pub trait ItemSource {
    type Item: Ord + Clone;

    /// Every currently selectable item. Called on every pick.
    fn all_items(&self) -> Vec<Self::Item>;
}

/// A [`NoRepeatPicker`] bound to the source it draws from.
pub struct Picker<S: ItemSource> {
    source: S,
    picker: NoRepeatPicker<S::Item>,
}

impl<S: ItemSource> Picker<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            picker: NoRepeatPicker::new(),
        }
    }

    pub fn with_seed(source: S, seed: u64) -> Self {
        Self {
            source,
            picker: NoRepeatPicker::with_seed(seed),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Query the source and pick from whatever it currently holds.
    pub fn pick(&mut self) -> Option<S::Item> {
        let items = self.source.all_items();
        self.picker.pick(items)
    }
}
