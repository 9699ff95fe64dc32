//! Stochastic terminal-age generation.
//!
//! Each realization gets a single simulated death age drawn from a
//! three-tier distribution around a baseline life expectancy: an
//! early-mortality band, a median band, and a longevity tail. Couples draw
//! a correlated pair so shared environment shows up in joint longevity.

use crate::rng::RandomSource;
use plan_core::types::{HealthStatus, Sex};

/// Default correlation between partners' terminal-age draws.
pub const DEFAULT_COUPLE_CORRELATION: f64 = 0.4;

/// Hard ceiling on any simulated terminal age.
pub const MAX_TERMINAL_AGE: f64 = 105.0;

/// One person's longevity inputs.
#[derive(Clone, Copy, Debug)]
pub struct LongevityProfile {
    /// Current age.
    pub current_age: u32,
    /// Baseline life expectancy the bands are centred on.
    pub baseline: u32,
    /// Sex for the ±1.5-year adjustment.
    pub sex: Sex,
    /// Health status for the additive offset.
    pub health: HealthStatus,
}

/// Band edges for a tier draw `u`, before adjustments.
fn band_edges(u: f64, current_age: u32, baseline: u32) -> (f64, f64) {
    let base = f64::from(baseline);
    let cur = f64::from(current_age);
    let (lo, hi) = if u < 0.25 {
        // Early-mortality band.
        ((cur + 5.0).max(base - 8.0), base - 3.0)
    } else if u < 0.75 {
        // Median band.
        (base - 2.0, base + 2.0)
    } else {
        // Longevity tail.
        (base + 3.0, (base + 7.0).min(MAX_TERMINAL_AGE))
    };
    (lo, hi.max(lo))
}

fn sex_adjustment(sex: Sex) -> f64 {
    match sex {
        Sex::Male => -1.5,
        Sex::Female => 1.5,
    }
}

/// Maps a tier draw plus a within-band draw to an adjusted, clamped,
/// rounded terminal age.
fn terminal_age_from_draws(profile: &LongevityProfile, tier_u: f64, band_u: f64) -> u32 {
    let (lo, hi) = band_edges(tier_u, profile.current_age, profile.baseline);
    let mut age = lo + (hi - lo) * band_u;
    age += sex_adjustment(profile.sex);
    age += profile.health.longevity_offset_years();

    let floor = f64::from(profile.current_age + 1).max(70.0);
    age.clamp(floor, MAX_TERMINAL_AGE).round() as u32
}

/// Draws one terminal age for a single person.
///
/// Consumes exactly two uniforms: the tier draw and the within-band draw.
pub fn draw_terminal_age(profile: &LongevityProfile, rng: &mut impl RandomSource) -> u32 {
    let tier_u = rng.next_uniform();
    let band_u = rng.next_uniform();
    terminal_age_from_draws(profile, tier_u, band_u)
}

/// Draws a correlated terminal-age pair for a couple.
///
/// The spouse's tier draw is `rho * u_user + (1 - rho) * u_indep`, then each
/// partner runs the same banding logic against their own baseline. Draw
/// order is fixed (user tier, spouse independent tier, user band, spouse
/// band) so recorded tapes replay exactly.
pub fn draw_couple_terminal_ages(
    user: &LongevityProfile,
    spouse: &LongevityProfile,
    rho: f64,
    rng: &mut impl RandomSource,
) -> (u32, u32) {
    let rho = rho.clamp(0.0, 1.0);
    let u_user = rng.next_uniform();
    let u_indep = rng.next_uniform();
    let u_spouse = rho * u_user + (1.0 - rho) * u_indep;

    let band_user = rng.next_uniform();
    let band_spouse = rng.next_uniform();

    (
        terminal_age_from_draws(user, u_user, band_user),
        terminal_age_from_draws(spouse, u_spouse, band_spouse),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::PlanRng;

    fn profile() -> LongevityProfile {
        LongevityProfile {
            current_age: 65,
            baseline: 87,
            sex: Sex::Male,
            health: HealthStatus::Good,
        }
    }

    #[test]
    fn test_band_edges_tiers() {
        // Early band for baseline 87, current 65: [79, 84].
        assert_eq!(band_edges(0.10, 65, 87), (79.0, 84.0));
        // Median band: [85, 89].
        assert_eq!(band_edges(0.50, 65, 87), (85.0, 89.0));
        // Longevity tail: [90, 94].
        assert_eq!(band_edges(0.90, 65, 87), (90.0, 94.0));
    }

    #[test]
    fn test_band_edges_never_inverted() {
        // Young person with low baseline pushes the early band's floor past
        // its ceiling; edges must still satisfy lo <= hi.
        let (lo, hi) = band_edges(0.10, 68, 72);
        assert!(lo <= hi);
        // Tail band near the 105 ceiling.
        let (lo, hi) = band_edges(0.90, 65, 103);
        assert!(lo <= hi);
        assert!(hi <= MAX_TERMINAL_AGE);
    }

    #[test]
    fn test_terminal_age_within_clamp_bounds() {
        let mut rng = PlanRng::from_seed(42);
        let p = profile();
        for _ in 0..2000 {
            let age = draw_terminal_age(&p, &mut rng);
            assert!((70..=105).contains(&age), "age {age}");
        }
    }

    #[test]
    fn test_terminal_age_floor_exceeds_current_age() {
        let mut rng = PlanRng::from_seed(42);
        let p = LongevityProfile {
            current_age: 95,
            baseline: 87,
            sex: Sex::Male,
            health: HealthStatus::Poor,
        };
        for _ in 0..500 {
            assert!(draw_terminal_age(&p, &mut rng) >= 96);
        }
    }

    #[test]
    fn test_tier_frequencies_roughly_quartile_half_quartile() {
        let mut rng = PlanRng::from_seed(7);
        let p = profile();
        let n = 20_000;
        let mut early = 0;
        let mut tail = 0;
        for _ in 0..n {
            let age = draw_terminal_age(&p, &mut rng);
            // Male adjustment shifts bands down 1.5 years; 84 - 1.5 rounds
            // into the early region, so classify against the shifted edges.
            if age <= 82 {
                early += 1;
            } else if age >= 89 {
                tail += 1;
            }
        }
        let early_frac = early as f64 / n as f64;
        let tail_frac = tail as f64 / n as f64;
        assert!((early_frac - 0.25).abs() < 0.05, "early {early_frac}");
        assert!((tail_frac - 0.25).abs() < 0.05, "tail {tail_frac}");
    }

    #[test]
    fn test_health_offset_shifts_draws() {
        let base = profile();
        let poor = LongevityProfile {
            health: HealthStatus::Poor,
            ..base
        };
        let mut rng_a = PlanRng::from_seed(11);
        let mut rng_b = PlanRng::from_seed(11);
        let n = 5_000;
        let mean_good: f64 =
            (0..n).map(|_| f64::from(draw_terminal_age(&base, &mut rng_a))).sum::<f64>() / n as f64;
        let mean_poor: f64 =
            (0..n).map(|_| f64::from(draw_terminal_age(&poor, &mut rng_b))).sum::<f64>() / n as f64;
        assert!(mean_good - mean_poor > 3.0, "good {mean_good} poor {mean_poor}");
    }

    #[test]
    fn test_couple_draws_are_correlated() {
        let user = profile();
        let spouse = LongevityProfile {
            sex: Sex::Female,
            ..profile()
        };
        let n = 10_000;

        let correlation_of = |rho: f64, seed: u64| {
            let mut rng = PlanRng::from_seed(seed);
            let pairs: Vec<(f64, f64)> = (0..n)
                .map(|_| {
                    let (a, b) = draw_couple_terminal_ages(&user, &spouse, rho, &mut rng);
                    (f64::from(a), f64::from(b))
                })
                .collect();
            let mean_a = pairs.iter().map(|p| p.0).sum::<f64>() / n as f64;
            let mean_b = pairs.iter().map(|p| p.1).sum::<f64>() / n as f64;
            let cov = pairs
                .iter()
                .map(|p| (p.0 - mean_a) * (p.1 - mean_b))
                .sum::<f64>()
                / n as f64;
            let var_a = pairs.iter().map(|p| (p.0 - mean_a).powi(2)).sum::<f64>() / n as f64;
            let var_b = pairs.iter().map(|p| (p.1 - mean_b).powi(2)).sum::<f64>() / n as f64;
            cov / (var_a.sqrt() * var_b.sqrt())
        };

        let correlated = correlation_of(DEFAULT_COUPLE_CORRELATION, 42);
        let independent = correlation_of(0.0, 42);
        assert!(correlated > independent + 0.1, "rho=0.4 gave {correlated}, rho=0 gave {independent}");
    }

    #[test]
    fn test_draws_deterministic_per_seed() {
        let p = profile();
        let mut a = PlanRng::from_seed(1234);
        let mut b = PlanRng::from_seed(1234);
        for _ in 0..100 {
            assert_eq!(draw_terminal_age(&p, &mut a), draw_terminal_age(&p, &mut b));
        }
    }
}
