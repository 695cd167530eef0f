use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use std::sync::{Mutex, PoisonError};

/// Lines shown when the judge cannot be reached.
pub static OFFLINE_PRAISE: &[&str] = &[
    "You are a superstar! 🌟",
    "That looked amazing! ✨",
    "Great job, buddy! 🎈",
    "You're a fast learner! 🚀",
    "Perfect! Keep going! 🌈",
    "Wonderful hand shapes! ✋",
    "You are doing so well! 🏆",
];

/// Seedable picker over [`OFFLINE_PRAISE`].
#[derive(Debug)]
pub struct PraisePicker {
    rng: Mutex<StdRng>,
}

impl PraisePicker {
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    #[must_use]
    pub fn from_entropy() -> Self {
        Self::seeded(rand::random())
    }

    pub fn pick(&self) -> &'static str {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        OFFLINE_PRAISE
            .choose(&mut *rng)
            .copied()
            .unwrap_or(OFFLINE_PRAISE[0])
    }
}

impl Default for PraisePicker {
    fn default() -> Self {
        Self::from_entropy()
    }
}
