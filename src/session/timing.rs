use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Standard typing-test estimate of characters per word.
const CHARS_PER_WORD: f64 = 5.0;
const JITTER_FRACTION: f64 = 0.3;

/// Reaction window used right after a rejected word.
pub const RECOVERY_REACTION_MS: (u64, u64) = (100, 300);
pub const SETTLE_DELAY: Duration = Duration::from_millis(50);

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimingProfile {
    pub reaction_min_ms: u64,
    pub reaction_max_ms: u64,
    pub wpm_min: u32,
    pub wpm_max: u32,
    /// Percent chance (0-100) of a typo before each non-final character.
    pub typo_chance: u32,
    pub typo_fix_delay_ms: u64,
}

impl Default for TimingProfile {
    fn default() -> Self {
        Self {
            reaction_min_ms: 200,
            reaction_max_ms: 500,
            wpm_min: 60,
            wpm_max: 90,
            typo_chance: 5,
            typo_fix_delay_ms: 300,
        }
    }
}

impl TimingProfile {
    pub fn reaction_delay<R: Rng>(&self, rng: &mut R) -> Duration {
        uniform_ms(rng, self.reaction_min_ms, self.reaction_max_ms)
    }

    pub fn sample_wpm<R: Rng>(&self, rng: &mut R) -> u32 {
        let lo = self.wpm_min.max(1);
        let hi = self.wpm_max.max(lo);
        rng.gen_range(lo..=hi)
    }

    /// Delay for one character at a freshly drawn speed, without jitter.
    pub fn char_delay<R: Rng>(&self, rng: &mut R) -> Duration {
        Duration::from_secs_f64(wpm_to_char_delay_ms(self.sample_wpm(rng)) / 1000.0)
    }

    /// `char_delay` scaled by a uniform factor in [0.7, 1.3].
    pub fn jittered_char_delay<R: Rng>(&self, rng: &mut R) -> Duration {
        let base = self.char_delay(rng);
        let factor = 1.0 + rng.gen_range(-JITTER_FRACTION..=JITTER_FRACTION);
        base.mul_f64(factor)
    }

    pub fn typo_fix_delay(&self) -> Duration {
        Duration::from_millis(self.typo_fix_delay_ms)
    }

    pub fn roll_typo<R: Rng>(&self, rng: &mut R) -> bool {
        rng.gen_range(0.0..100.0) < f64::from(self.typo_chance)
    }
}

pub fn wpm_to_char_delay_ms(wpm: u32) -> f64 {
    60_000.0 / (f64::from(wpm.max(1)) * CHARS_PER_WORD)
}

/// Uniform whole-millisecond delay in [min, max]; a reversed range collapses to `min`.
pub fn uniform_ms<R: Rng>(rng: &mut R, min: u64, max: u64) -> Duration {
    let hi = max.max(min);
    Duration::from_millis(rng.gen_range(min..=hi))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    #[test]
    fn test_wpm_to_char_delay() {
        assert!((wpm_to_char_delay_ms(60) - 200.0).abs() < 1e-9);
        assert!((wpm_to_char_delay_ms(120) - 100.0).abs() < 1e-9);
        // Zero is clamped rather than dividing by zero.
        assert!(wpm_to_char_delay_ms(0).is_finite());
    }

    #[test]
    fn test_reaction_delay_stays_in_range() {
        let mut rng = SmallRng::seed_from_u64(1);
        let profile = TimingProfile::default();
        for _ in 0..500 {
            let ms = profile.reaction_delay(&mut rng).as_millis() as u64;
            assert!((200..=500).contains(&ms));
        }
    }

    #[test]
    fn test_jitter_stays_within_thirty_percent() {
        let mut rng = SmallRng::seed_from_u64(2);
        let profile = TimingProfile {
            wpm_min: 60,
            wpm_max: 60,
            ..TimingProfile::default()
        };
        for _ in 0..500 {
            let ms = profile.jittered_char_delay(&mut rng).as_secs_f64() * 1000.0;
            assert!((140.0 - 1e-6..=260.0 + 1e-6).contains(&ms), "{ms}");
        }
    }

    #[test]
    fn test_typo_roll_extremes() {
        let mut rng = SmallRng::seed_from_u64(3);
        let never = TimingProfile {
            typo_chance: 0,
            ..TimingProfile::default()
        };
        let always = TimingProfile {
            typo_chance: 100,
            ..TimingProfile::default()
        };
        for _ in 0..200 {
            assert!(!never.roll_typo(&mut rng));
            assert!(always.roll_typo(&mut rng));
        }
    }

    #[test]
    fn test_reversed_ranges_collapse() {
        let mut rng = SmallRng::seed_from_u64(4);
        assert_eq!(uniform_ms(&mut rng, 300, 100), Duration::from_millis(300));
        let profile = TimingProfile {
            wpm_min: 90,
            wpm_max: 10,
            ..TimingProfile::default()
        };
        assert_eq!(profile.sample_wpm(&mut rng), 90);
    }
}
