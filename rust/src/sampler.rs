//! Seeded random sources and triangular duration sampling.

use xxhash_rust::xxh3::xxh3_64_with_seed;

use crate::calendar::whole_days;
use crate::error::ScheduleError;
use crate::models::{Estimate, Task};

/// Substituted for a zero seed, which would leave xorshift stuck at zero.
const ZERO_SEED_STATE: u64 = 0x9E37_79B9_7F4A_7C15;

/// Source of uniformly distributed random bits.
pub trait RandomSource {
    fn next_u64(&mut self) -> u64;

    /// Uniform float in `[0, 1)` built from the top 53 bits.
    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }
}

/// Small deterministic xorshift64 generator.
#[derive(Clone, Debug)]
pub struct XorShiftRng {
    state: u64,
}

impl XorShiftRng {
    pub fn new(seed: u64) -> Self {
        Self {
            state: if seed == 0 { ZERO_SEED_STATE } else { seed },
        }
    }
}

impl RandomSource for XorShiftRng {
    fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }
}

/// Seed for trial `trial`, derived only from the top-level seed and the index.
pub fn trial_seed(seed: u64, trial: usize) -> u64 {
    xxh3_64_with_seed(&(trial as u64).to_le_bytes(), seed)
}

/// Draw from the triangular distribution over `[min, max]` with mode `likely`.
///
/// A degenerate estimate returns its value without consuming randomness.
pub fn sample_triangular<R: RandomSource + ?Sized>(estimate: &Estimate, rng: &mut R) -> f64 {
    if estimate.is_degenerate() {
        return estimate.likely_days;
    }
    let Estimate {
        min_days: a,
        likely_days: c,
        max_days: b,
    } = *estimate;

    let u = rng.next_f64();
    let split = (c - a) / (b - a);
    if u < split {
        a + (u * (b - a) * (c - a)).sqrt()
    } else {
        b - ((1.0 - u) * (b - a) * (b - c)).sqrt()
    }
}

/// Sample a duration and round it to whole days the same way the likely
/// estimate is rounded.
///
/// Returns the reason if the draw is not a positive finite number.
pub fn sample_days<R: RandomSource + ?Sized>(
    estimate: &Estimate,
    rng: &mut R,
) -> Result<u32, String> {
    let days = sample_triangular(estimate, rng);
    if !days.is_finite() || days <= 0.0 {
        return Err(format!("sampled duration {} is not a positive number", days));
    }
    Ok(whole_days(days))
}

/// One sampled duration per task, in input order.
pub fn sample_durations<R: RandomSource + ?Sized>(
    tasks: &[Task],
    rng: &mut R,
) -> Result<Vec<u32>, ScheduleError> {
    tasks
        .iter()
        .map(|task| {
            sample_days(&task.estimate, rng).map_err(|reason| ScheduleError::InvalidEstimate {
                task_id: task.id.clone(),
                reason,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Replays a fixed sequence of `next_f64` values.
    struct Scripted(Vec<f64>);

    impl RandomSource for Scripted {
        fn next_u64(&mut self) -> u64 {
            unreachable!("only next_f64 is scripted")
        }

        fn next_f64(&mut self) -> f64 {
            self.0.remove(0)
        }
    }

    #[test]
    fn test_same_seed_same_stream() {
        let mut a = XorShiftRng::new(42);
        let mut b = XorShiftRng::new(42);
        for _ in 0..100 {
            assert_eq!(a.next_u64(), b.next_u64());
        }
        assert_ne!(XorShiftRng::new(1).next_u64(), XorShiftRng::new(2).next_u64());
    }

    #[test]
    fn test_zero_seed_not_stuck() {
        let mut rng = XorShiftRng::new(0);
        assert_ne!(rng.next_u64(), 0);
        assert_ne!(rng.next_u64(), rng.next_u64());
    }

    #[test]
    fn test_next_f64_unit_interval() {
        let mut rng = XorShiftRng::new(7);
        for _ in 0..10_000 {
            let x = rng.next_f64();
            assert!((0.0..1.0).contains(&x));
        }
    }

    #[test]
    fn test_trial_seed_depends_on_index_and_seed() {
        assert_eq!(trial_seed(5, 3), trial_seed(5, 3));
        assert_ne!(trial_seed(5, 3), trial_seed(5, 4));
        assert_ne!(trial_seed(5, 3), trial_seed(6, 3));
    }

    #[test]
    fn test_degenerate_estimate_skips_rng() {
        let mut rng = Scripted(vec![]);
        assert_eq!(sample_triangular(&Estimate::fixed(3.0), &mut rng), 3.0);
        assert_eq!(sample_days(&Estimate::fixed(3.0), &mut rng), Ok(3));
    }

    #[test]
    fn test_inverse_cdf_endpoints() {
        let estimate = Estimate::new(2.0, 3.0, 5.0);
        let mut rng = Scripted(vec![0.0, 1.0 / 3.0, 0.999_999_999]);
        assert_eq!(sample_triangular(&estimate, &mut rng), 2.0);
        assert!((sample_triangular(&estimate, &mut rng) - 3.0).abs() < 1e-9);
        assert!((sample_triangular(&estimate, &mut rng) - 5.0).abs() < 1e-3);
    }

    #[test]
    fn test_samples_within_bounds() {
        let estimate = Estimate::new(2.0, 3.0, 5.0);
        let mut rng = XorShiftRng::new(99);
        let mut total = 0.0;
        for _ in 0..10_000 {
            let x = sample_triangular(&estimate, &mut rng);
            assert!((2.0..=5.0).contains(&x));
            total += x;
            let days = sample_days(&estimate, &mut rng).unwrap();
            assert!((2..=5).contains(&days));
        }
        // Triangular mean is (a + b + c) / 3
        let mean = total / 10_000.0;
        assert!((mean - 10.0 / 3.0).abs() < 0.05, "mean {}", mean);
    }

    #[test]
    fn test_mode_at_min() {
        let estimate = Estimate::new(1.0, 1.0, 4.0);
        let mut rng = XorShiftRng::new(3);
        for _ in 0..1000 {
            let x = sample_triangular(&estimate, &mut rng);
            assert!((1.0..=4.0).contains(&x));
        }
    }

    #[test]
    fn test_non_positive_sample_rejected() {
        let tasks = vec![Task::new("bad", 1, Estimate::new(-2.0, -1.0, 0.0))];
        let err = sample_durations(&tasks, &mut XorShiftRng::new(1)).unwrap_err();
        assert!(matches!(err, ScheduleError::InvalidEstimate { task_id, .. } if task_id == "bad"));
    }

    #[test]
    fn test_sample_durations_in_input_order() {
        let tasks = vec![
            Task::new("a", 2, Estimate::fixed(4.0)),
            Task::new("b", 1, Estimate::fixed(1.5)),
        ];
        let durations = sample_durations(&tasks, &mut XorShiftRng::new(1)).unwrap();
        assert_eq!(durations, vec![4, 2]);
    }
}
