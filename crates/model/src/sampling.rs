//! Random variates and special functions used by occupation models

use rand::Rng;
use rand_distr::{Distribution, Poisson, StandardNormal};
use std::f64::consts::PI;

/// Error function, Abramowitz & Stegun 7.1.26 (|error| < 1.5e-7)
pub fn erf(x: f64) -> f64 {
    const A1: f64 = 0.254_829_592;
    const A2: f64 = -0.284_496_736;
    const A3: f64 = 1.421_413_741;
    const A4: f64 = -1.453_152_027;
    const A5: f64 = 1.061_405_429;
    const P: f64 = 0.327_591_1;

    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let x = x.abs();
    let t = 1.0 / (1.0 + P * x);
    let poly = ((((A5 * t + A4) * t + A3) * t + A2) * t + A1) * t;
    sign * (1.0 - poly * (-x * x).exp())
}

/// Standard normal variate
pub fn standard_normal<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    StandardNormal.sample(rng)
}

/// Poisson variate
///
/// Non-positive `lambda` draws zero. Returns `None` for an infinite or NaN
/// `lambda`, which has no meaningful draw.
pub fn poisson<R: Rng + ?Sized>(rng: &mut R, lambda: f64) -> Option<u64> {
    if !lambda.is_finite() {
        return None;
    }
    if lambda <= 0.0 {
        return Some(0);
    }
    let draw: f64 = Poisson::new(lambda).ok()?.sample(rng);
    Some(draw as u64)
}

/// Uniform unit vector
pub fn unit_vector<R: Rng + ?Sized>(rng: &mut R) -> [f64; 3] {
    let cos_theta = 2.0 * rng.gen::<f64>() - 1.0;
    let sin_theta = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();
    let phi = 2.0 * PI * rng.gen::<f64>();
    [sin_theta * phi.cos(), sin_theta * phi.sin(), cos_theta]
}

fn nfw_enclosed(x: f64) -> f64 {
    (1.0 + x).ln() - x / (1.0 + x)
}

/// Radius, as a fraction of the halo boundary, drawn from an NFW profile
/// with concentration `conc`
///
/// Inverts the enclosed-mass CDF by bisection.
pub fn nfw_radius_fraction<R: Rng + ?Sized>(rng: &mut R, conc: f64) -> f64 {
    if !(conc > 0.0) {
        return rng.gen::<f64>().cbrt();
    }
    let target = rng.gen::<f64>() * nfw_enclosed(conc);
    let (mut lo, mut hi) = (0.0_f64, 1.0_f64);
    for _ in 0..48 {
        let mid = 0.5 * (lo + hi);
        if nfw_enclosed(conc * mid) < target {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    0.5 * (lo + hi)
}
