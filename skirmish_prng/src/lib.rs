// Seedable randomness for combat-agent decisions.
//
// Two pieces live here:
// - `GameRng`: xoshiro256++ (Blackman & Vigna, 2019) seeded through
//   SplitMix64. Hand-rolled so the output stream is bit-identical on every
//   platform and every compiler.
// - `RandomSource`: the narrow interface the policy evaluator draws from.
//   Decisions never reach for an ambient generator; the caller passes a
//   source in, so a fixed seed (or a `ReplayRng` script) reproduces every
//   coin-flip, detection roll and route pick.
//
// See also: `skirmish_ai::policy` for the consumers of `RandomSource`,
// `skirmish_ai::planner` which threads one source through a whole tick.
//
// **Critical constraint: determinism.** The integer core of `GameRng` must
// not use floating point, OS entropy, or the stdlib hasher. Float outputs are
// derived from integer bits only.

use serde::{Deserialize, Serialize};

/// Uniform randomness as consumed by decision code.
///
/// Only the two draws the policies need are required; anything richer
/// belongs on the concrete generator.
pub trait RandomSource {
    /// Uniform value in `[0, 1)`.
    fn next_f32(&mut self) -> f32;

    /// Uniform index in `[low, high)`. Panics if `low >= high`.
    fn range_usize(&mut self, low: usize, high: usize) -> usize;
}

/// Xoshiro256++ generator with 256 bits of state.
///
/// Each agent controller (or the whole host tick) owns one of these. Cloning
/// forks the stream: both copies continue with identical output.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GameRng {
    s: [u64; 4],
}

impl GameRng {
    /// Seed a generator from a single `u64`. Equal seeds give equal streams.
    pub fn new(seed: u64) -> Self {
        let mut sm = seed;
        let s = [
            splitmix64(&mut sm),
            splitmix64(&mut sm),
            splitmix64(&mut sm),
            splitmix64(&mut sm),
        ];
        Self { s }
    }

    pub fn next_u64(&mut self) -> u64 {
        let out = self.s[0]
            .wrapping_add(self.s[3])
            .rotate_left(23)
            .wrapping_add(self.s[0]);
        let t = self.s[1] << 17;

        self.s[2] ^= self.s[0];
        self.s[3] ^= self.s[1];
        self.s[1] ^= self.s[2];
        self.s[0] ^= self.s[3];
        self.s[2] ^= t;
        self.s[3] = self.s[3].rotate_left(45);

        out
    }

    /// Upper 32 bits of the next `u64`.
    pub fn next_u32(&mut self) -> u32 {
        (self.next_u64() >> 32) as u32
    }

    /// Uniform `f32` in `[0, 1)` built from the top 24 bits.
    pub fn next_f32(&mut self) -> f32 {
        (self.next_u64() >> 40) as f32 / (1u64 << 24) as f32
    }

    /// Uniform `f64` in `[0, 1)` built from the top 53 bits.
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Uniform integer in `[low, high)` without modulo bias.
    ///
    /// Panics if `low >= high`.
    pub fn range_u64(&mut self, low: u64, high: u64) -> u64 {
        assert!(low < high, "range_u64: empty range {low}..{high}");
        let span = high - low;
        if span.is_power_of_two() {
            return low + (self.next_u64() & (span - 1));
        }
        // Reject the short tail so every residue is equally likely.
        let threshold = span.wrapping_neg() % span;
        loop {
            let r = self.next_u64();
            if r >= threshold {
                return low + r % span;
            }
        }
    }

    pub fn range_usize(&mut self, low: usize, high: usize) -> usize {
        self.range_u64(low as u64, high as u64) as usize
    }

    /// `true` with probability `p`. `p <= 0` never fires, `p >= 1` always does.
    pub fn random_bool(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }
}

impl RandomSource for GameRng {
    fn next_f32(&mut self) -> f32 {
        GameRng::next_f32(self)
    }

    fn range_usize(&mut self, low: usize, high: usize) -> usize {
        GameRng::range_usize(self, low, high)
    }
}

/// A scripted source that replays a fixed list of unit draws, cycling when
/// it runs out.
///
/// Used to pin a decision branch (e.g. force a backup call with `0.1`, force
/// the opposite with `0.9`) and to replay recorded ticks. Index draws map
/// the scripted value onto the requested range.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReplayRng {
    values: Vec<f32>,
    cursor: usize,
}

impl ReplayRng {
    /// Build a replay source. An empty script behaves like `[0.0]`.
    pub fn new(values: Vec<f32>) -> Self {
        let values = if values.is_empty() { vec![0.0] } else { values };
        Self { values, cursor: 0 }
    }

    /// A source that always returns `value`.
    pub fn constant(value: f32) -> Self {
        Self::new(vec![value])
    }

    /// Number of draws taken so far.
    pub fn draws(&self) -> usize {
        self.cursor
    }

    fn next_scripted(&mut self) -> f32 {
        let v = self.values[self.cursor % self.values.len()];
        self.cursor += 1;
        v.clamp(0.0, 1.0 - f32::EPSILON)
    }
}

impl RandomSource for ReplayRng {
    fn next_f32(&mut self) -> f32 {
        self.next_scripted()
    }

    fn range_usize(&mut self, low: usize, high: usize) -> usize {
        assert!(low < high, "range_usize: empty range {low}..{high}");
        let span = high - low;
        let offset = (self.next_scripted() * span as f32) as usize;
        low + offset.min(span - 1)
    }
}

/// SplitMix64 step, used only to expand a seed into xoshiro state.
fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9e37_79b9_7f4a_7c15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_seeds_give_equal_streams() {
        let mut a = GameRng::new(7);
        let mut b = GameRng::new(7);
        for _ in 0..500 {
            assert_eq!(a.next_u64(), b.next_u64());
        }
    }

    #[test]
    fn different_seeds_diverge() {
        let mut a = GameRng::new(7);
        let mut b = GameRng::new(8);
        assert_ne!(a.next_u64(), b.next_u64());
    }

    #[test]
    fn unit_floats_stay_in_range() {
        let mut rng = GameRng::new(2024);
        for _ in 0..10_000 {
            let f = rng.next_f32();
            assert!((0.0..1.0).contains(&f), "f32 out of range: {f}");
            let d = rng.next_f64();
            assert!((0.0..1.0).contains(&d), "f64 out of range: {d}");
        }
    }

    #[test]
    fn range_usize_respects_bounds() {
        let mut rng = GameRng::new(31);
        for _ in 0..10_000 {
            let v = rng.range_usize(3, 9);
            assert!((3..9).contains(&v), "range_usize out of range: {v}");
        }
    }

    #[test]
    fn random_bool_extremes_are_fixed() {
        let mut rng = GameRng::new(1);
        for _ in 0..100 {
            assert!(!rng.random_bool(0.0));
            assert!(rng.random_bool(1.0));
        }
    }

    #[test]
    fn random_source_matches_inherent_methods() {
        fn draw(src: &mut impl RandomSource) -> (f32, usize) {
            (src.next_f32(), src.range_usize(0, 10))
        }
        let mut a = GameRng::new(99);
        let mut b = GameRng::new(99);
        let via_trait = draw(&mut a);
        let direct = (b.next_f32(), b.range_usize(0, 10));
        assert_eq!(via_trait, direct);
    }

    #[test]
    fn serialized_state_resumes_the_stream() {
        let mut rng = GameRng::new(5);
        for _ in 0..50 {
            rng.next_u64();
        }
        let json = serde_json::to_string(&rng).unwrap();
        let mut restored: GameRng = serde_json::from_str(&json).unwrap();
        for _ in 0..50 {
            assert_eq!(rng.next_u64(), restored.next_u64());
        }
    }

    #[test]
    fn replay_cycles_through_script() {
        let mut rng = ReplayRng::new(vec![0.1, 0.9]);
        assert_eq!(rng.next_f32(), 0.1);
        assert_eq!(rng.next_f32(), 0.9);
        assert_eq!(rng.next_f32(), 0.1);
        assert_eq!(rng.draws(), 3);
    }

    #[test]
    fn replay_index_draws_cover_the_range() {
        let mut low = ReplayRng::constant(0.0);
        assert_eq!(low.range_usize(0, 4), 0);
        let mut high = ReplayRng::constant(1.0);
        assert_eq!(high.range_usize(0, 4), 3);
        let mut mid = ReplayRng::constant(0.5);
        assert_eq!(mid.range_usize(10, 14), 12);
    }

    #[test]
    fn empty_replay_script_yields_zero() {
        let mut rng = ReplayRng::new(Vec::new());
        assert_eq!(rng.next_f32(), 0.0);
    }
}
