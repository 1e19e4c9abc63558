use claim::{debug_assert_ge, debug_assert_le};
use statrs::distribution::{ContinuousCDF, Normal};

/// The standard error of a proportion `p` estimated from `n` Bernoulli trials,
/// `sqrt(p * (1 - p) / n)`.
pub fn std_error(p: f64, n: u64) -> f64 {
    debug_assert_ge!(p, 0.0);
    debug_assert_le!(p, 1.0);

    if n == 0 {
        return f64::NAN;
    }
    (p * (1.0 - p) / (n as f64)).sqrt()
}

/// The CDF of the standard normal distribution, `Pr[Z <= x]`.
pub fn std_normal_cdf(x: f64) -> f64 {
    // N(0, 1) always has valid parameters
    match Normal::new(0.0, 1.0) {
        Ok(normal) => normal.cdf(x),
        Err(_) => f64::NAN,
    }
}

/// The pooled two-proportion z-test statistic for `H_0: p_1 = p_2`, given
/// `k_i` successes out of `n_i` trials.
///
/// Returns `None` if the pooled standard error is zero, i.e., both samples
/// are all successes or all failures.
pub fn two_proportion_z(k1: u64, n1: u64, k2: u64, n2: u64) -> Option<f64> {
    debug_assert_le!(k1, n1);
    debug_assert_le!(k2, n2);

    let (n1f, n2f) = (n1 as f64, n2 as f64);
    let p1 = (k1 as f64) / n1f;
    let p2 = (k2 as f64) / n2f;

    // pooled p = (k1 + k2) / (n1 + n2)
    let p = ((k1 + k2) as f64) / (n1f + n2f);
    let se = (p * (1.0 - p) * (1.0 / n1f + 1.0 / n2f)).sqrt();

    if se > 0.0 && se.is_finite() {
        Some((p1 - p2) / se)
    } else {
        None
    }
}

/// The two-sided p-value of the pooled two-proportion z-test,
/// `Pr[|Z| >= |z| | H_0: p_1 = p_2]`.
///
/// If the pooled standard error is zero, the samples are identical (all
/// successes or all failures on both sides), so there's no evidence against
/// `H_0` and the p-value is `1.0`.
pub fn two_proportion_pvalue(k1: u64, n1: u64, k2: u64, n2: u64) -> f64 {
    match two_proportion_z(k1, n1, k2, n2) {
        Some(z) => 2.0 * (1.0 - std_normal_cdf(z.abs())),
        None => 1.0,
    }
}
