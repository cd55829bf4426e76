//! Synthetic CQS trend lines.
//!
//! There is no stored score history yet, so each video gets a few fabricated
//! points placed before its publish time, derived from the current score plus
//! random noise. The output is placeholder data for the trend chart and must
//! not be read as measurement.

use crate::analyzers::types::TrendPoint;
use crate::config::{HistoryConfig, Perturbation};
use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub struct TrendGenerator<R: Rng> {
    rng: R,
    /// Days before publish, largest first so points come out in date order.
    offsets_days: Vec<i64>,
    perturbation: Perturbation,
}

impl TrendGenerator<StdRng> {
    /// Seeded from `config.seed`, or from OS entropy when no seed is set.
    pub fn from_config(config: &HistoryConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::new(rng, &config.offsets_days, config.perturbation)
    }
}

impl<R: Rng> TrendGenerator<R> {
    pub fn new(rng: R, offsets_days: &[i64], perturbation: Perturbation) -> Self {
        let mut offsets_days = offsets_days.to_vec();
        offsets_days.sort_unstable_by(|a, b| b.cmp(a));
        offsets_days.dedup();

        Self {
            rng,
            offsets_days,
            perturbation,
        }
    }

    /// One point per configured offset, oldest first.
    pub fn history_for(&mut self, published_at: DateTime<Utc>, cqs: f64) -> Vec<TrendPoint> {
        let offsets = self.offsets_days.clone();
        offsets
            .into_iter()
            .map(|days| TrendPoint {
                t: published_at - Duration::days(days),
                cqs: self.perturb(cqs),
            })
            .collect()
    }

    /// Draws a noisy copy of `cqs` that keeps its sign.
    pub fn perturb(&mut self, cqs: f64) -> f64 {
        let value = match self.perturbation {
            Perturbation::Additive { low, high } => cqs + self.rng.gen_range(low..=high),
            Perturbation::Multiplicative { low, high } => cqs * self.rng.gen_range(low..=high),
        };

        if (cqs >= 0.0 && value < 0.0) || (cqs < 0.0 && value > 0.0) {
            0.0
        } else {
            value
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn published() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 30, 9, 30, 0).unwrap()
    }

    fn seeded(perturbation: Perturbation) -> TrendGenerator<StdRng> {
        TrendGenerator::new(StdRng::seed_from_u64(42), &[21, 14, 7], perturbation)
    }

    #[test]
    fn test_three_points_before_publish_in_order() {
        let mut generator = seeded(Perturbation::default());
        let points = generator.history_for(published(), 0.5);

        assert_eq!(points.len(), 3);
        assert_eq!(points[0].t, published() - Duration::days(21));
        assert_eq!(points[1].t, published() - Duration::days(14));
        assert_eq!(points[2].t, published() - Duration::days(7));
        assert!(points.windows(2).all(|w| w[0].t < w[1].t));
    }

    #[test]
    fn test_offsets_are_normalised() {
        let mut generator = TrendGenerator::new(
            StdRng::seed_from_u64(1),
            &[7, 21, 14, 7],
            Perturbation::default(),
        );
        let points = generator.history_for(published(), 1.0);
        assert_eq!(points.len(), 3);
        assert_eq!(points[0].t, published() - Duration::days(21));
    }

    #[test]
    fn test_same_seed_same_history() {
        let a = seeded(Perturbation::default()).history_for(published(), 0.7);
        let b = seeded(Perturbation::default()).history_for(published(), 0.7);
        assert_eq!(a, b);
    }

    #[test]
    fn test_multiplicative_stays_in_range() {
        let mut generator = seeded(Perturbation::Multiplicative { low: 0.9, high: 1.1 });
        for _ in 0..200 {
            let v = generator.perturb(10.0);
            assert!((9.0 - 1e-9..=11.0 + 1e-9).contains(&v));
        }
    }

    #[test]
    fn test_additive_never_flips_sign() {
        let mut generator = seeded(Perturbation::Additive { low: -1.0, high: 1.0 });
        for _ in 0..200 {
            assert!(generator.perturb(0.05) >= 0.0);
            assert!(generator.perturb(-0.05) <= 0.0);
        }
    }

    #[test]
    fn test_from_config_uses_seed() {
        let config = HistoryConfig {
            seed: Some(9),
            ..Default::default()
        };
        let a = TrendGenerator::from_config(&config).perturb(1.0);
        let b = TrendGenerator::from_config(&config).perturb(1.0);
        assert_eq!(a, b);
    }
}
