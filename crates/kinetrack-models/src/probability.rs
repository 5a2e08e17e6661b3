//! Bijection between probabilities in (0, 1) and unconstrained scores.
//!
//! Bounded quantities such as the occlusion probability are carried through
//! the filter as logit scores so that particle arithmetic (sums, averages)
//! never leaves the valid domain once mapped back with [`sigmoid`].

/// Probabilities are clamped to `[ε, 1 − ε]` before taking the logit so that
/// boundary values map to finite scores.
pub const PROBABILITY_EPSILON: f64 = 1e-12;

/// Logistic function `1 / (1 + e^(−x))`.
///
/// Evaluated on the side that cannot overflow, so very large `|x|` returns
/// `0.0` or `1.0` instead of NaN.
pub fn sigmoid(x: f64) -> f64 {
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let e = x.exp();
        e / (1.0 + e)
    }
}

/// Log-odds `ln(p / (1 − p))`, with `p` clamped to
/// `[PROBABILITY_EPSILON, 1 − PROBABILITY_EPSILON]`.
pub fn logit(p: f64) -> f64 {
    let p = p.clamp(PROBABILITY_EPSILON, 1.0 - PROBABILITY_EPSILON);
    (p / (1.0 - p)).ln()
}

/// Stateless strategy wrapping [`sigmoid`] and [`logit`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LogitTransform;

impl LogitTransform {
    /// Map an unconstrained score to a probability.
    pub fn to_probability(&self, score: f64) -> f64 {
        sigmoid(score)
    }

    /// Map a probability to an unconstrained score.
    pub fn to_score(&self, probability: f64) -> f64 {
        logit(probability)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn sigmoid_of_zero_is_one_half() {
        assert_abs_diff_eq!(sigmoid(0.0), 0.5);
        assert_abs_diff_eq!(logit(0.5), 0.0);
    }

    #[test]
    fn logit_inverts_sigmoid() {
        for x in [-20.0, -3.5, -0.1, 0.0, 0.7, 4.2, 15.0] {
            assert_abs_diff_eq!(logit(sigmoid(x)), x, epsilon = 1e-6);
        }
        for p in [0.001, 0.2, 0.5, 0.9, 0.999] {
            assert_abs_diff_eq!(sigmoid(logit(p)), p, epsilon = 1e-12);
        }
    }

    #[test]
    fn sigmoid_saturates_without_nan() {
        assert_eq!(sigmoid(1e4), 1.0);
        assert_eq!(sigmoid(-1e4), 0.0);
        assert!(!sigmoid(f64::MAX).is_nan());
        assert!(!sigmoid(f64::MIN).is_nan());
    }

    #[test]
    fn logit_of_boundaries_is_finite() {
        let lo = logit(0.0);
        let hi = logit(1.0);
        assert!(lo.is_finite() && lo < -20.0, "lo={lo}");
        assert!(hi.is_finite() && hi > 20.0, "hi={hi}");
        assert!(sigmoid(lo) > 0.0);
        assert!(sigmoid(hi) < 1.0);
    }

    #[test]
    fn transform_matches_free_functions() {
        let t = LogitTransform;
        assert_eq!(t.to_probability(1.3), sigmoid(1.3));
        assert_eq!(t.to_score(0.3), logit(0.3));
    }
}
