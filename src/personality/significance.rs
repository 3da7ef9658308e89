//! Exact two-sided binomial test
//!
//! Matches the usual "minimum likelihood" definition: the p-value is the
//! total probability of every outcome no more likely than the observed one.

/// Relative tolerance when comparing outcome probabilities
const RELATIVE_TOLERANCE: f64 = 1.0 + 1e-7;

/// ln(n choose k)
fn ln_choose(n: usize, k: usize) -> f64 {
    let k = k.min(n - k);
    (1..=k)
        .map(|i| ((n - k + i) as f64).ln() - (i as f64).ln())
        .sum()
}

/// P(X = k) for X ~ Binomial(n, p)
fn binomial_pmf(k: usize, n: usize, p: f64) -> f64 {
    if p <= 0.0 {
        return if k == 0 { 1.0 } else { 0.0 };
    }
    if p >= 1.0 {
        return if k == n { 1.0 } else { 0.0 };
    }
    (ln_choose(n, k) + k as f64 * p.ln() + (n - k) as f64 * (1.0 - p).ln()).exp()
}

/// Two-sided p-value of observing `successes` out of `trials` under `p`
///
/// Zero trials carry no evidence and give a p-value of 1.
pub fn binomial_test_two_sided(successes: usize, trials: usize, p: f64) -> f64 {
    if trials == 0 {
        return 1.0;
    }
    let successes = successes.min(trials);
    let observed = binomial_pmf(successes, trials, p);
    let threshold = observed * RELATIVE_TOLERANCE;

    let p_value: f64 = (0..=trials)
        .map(|k| binomial_pmf(k, trials, p))
        .filter(|prob| *prob <= threshold)
        .sum();

    p_value.min(1.0)
}

/// Whether a split between two letters differs from a fair coin at `alpha`
pub fn is_significant_difference(count_a: usize, count_b: usize, alpha: f64) -> bool {
    let total = count_a + count_b;
    if total == 0 {
        return false;
    }
    binomial_test_two_sided(count_a, total, 0.5) < alpha
}
