use special::Gamma as SpecialGamma;

/// `ln(2π)`
pub const LN_2PI: f64 = 1.837_877_066_409_345_5;

/// Digamma function `ψ(x) = d/dx ln Γ(x)`
#[inline]
pub fn digamma(x: f64) -> f64 {
    SpecialGamma::digamma(x)
}

/// Natural log of the absolute value of `Γ(x)`
#[inline]
pub fn ln_gamma(x: f64) -> f64 {
    SpecialGamma::ln_gamma(x).0
}

/// Trigamma function `ψ₁(x) = d²/dx² ln Γ(x)`, defined for `x > 0`.
///
/// Shift `x` up with the recurrence `ψ₁(x) = ψ₁(x + 1) + 1/x²` until the
/// asymptotic expansion
///
/// ```text
/// ψ₁(x) ~ 1/x + 1/(2x²) + 1/(6x³) - 1/(30x⁵) + 1/(42x⁷) - 1/(30x⁹)
/// ```
///
/// is accurate to double precision.
pub fn trigamma(x: f64) -> f64 {
    if x.is_nan() || x <= 0.0 {
        return f64::NAN;
    }

    let mut x = x;
    let mut acc = 0.0;
    while x < 20.0 {
        acc += 1.0 / (x * x);
        x += 1.0;
    }

    let inv = 1.0 / x;
    let inv2 = inv * inv;
    let tail = inv * inv2 * (1.0 / 6.0 - inv2 * (1.0 / 30.0 - inv2 * (1.0 / 42.0 - inv2 / 30.0)));
    acc + inv + 0.5 * inv2 + tail
}

/// `softplus(x) = ln(1 + eˣ)`, a smooth strictly-positive map
#[inline]
pub fn softplus(x: f64) -> f64 {
    x.max(0.0) + (-x.abs()).exp().ln_1p()
}

/// Derivative of [`softplus`], i.e., the logistic function
#[inline]
pub fn sigmoid(x: f64) -> f64 {
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let ex = x.exp();
        ex / (1.0 + ex)
    }
}

/// Inverse of [`softplus`] for `y > 0`
#[inline]
pub fn inv_softplus(y: f64) -> f64 {
    y + (-(-y).exp_m1()).ln()
}
