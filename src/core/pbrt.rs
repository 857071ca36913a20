//! Scalar type alias, numeric constants, and small free-function helpers
//! shared across the math kernel. See pbrt.h in the teacher lineage.

use std::ops::{Add, Mul, Sub};

pub type Float = f32;

pub const PI: Float = std::f32::consts::PI;
pub const INV_PI: Float = std::f32::consts::FRAC_1_PI;
pub const INV_2_PI: Float = 0.159_154_94;
pub const INV_4_PI: Float = 0.079_577_47;
pub const PI_OVER_2: Float = std::f32::consts::FRAC_PI_2;
pub const PI_OVER_4: Float = std::f32::consts::FRAC_PI_4;
pub const ONE_MINUS_EPSILON: Float = 1.0 - Float::EPSILON;
pub const SHADOW_EPSILON: Float = 1e-4;
pub const MACHINE_EPSILON: Float = Float::EPSILON * 0.5;

/// Minimum alpha for `RoughnessToAlpha`; a perfectly smooth microfacet
/// distribution is numerically unstable, so alpha is floored here.
pub const MIN_ALPHA: Float = 2e-3;

/// Default dielectric reflectance at normal incidence, used by
/// `core::microfacet::f0` to blend basecolor/metallic materials.
pub const DEFAULT_REFLECTANCE: Float = 0.04;

#[inline]
pub fn clamp_t<T: PartialOrd>(val: T, low: T, high: T) -> T {
    if val < low {
        low
    } else if val > high {
        high
    } else {
        val
    }
}

#[inline]
pub fn lerp<T>(t: Float, a: T, b: T) -> T
where
    T: Add<Output = T> + Sub<Output = T> + Mul<Float, Output = T> + Copy,
{
    a * (1.0 - t) + b * t
}

#[inline]
pub fn radians(deg: Float) -> Float {
    PI / 180.0 * deg
}

#[inline]
pub fn degrees(rad: Float) -> Float {
    180.0 / PI * rad
}

#[inline]
pub fn float_near(a: Float, b: Float, eps: Float) -> bool {
    (a - b).abs() <= eps
}

/// `std::lower_bound`-style binary search used by `Distribution1D` and the
/// dynamic BVH's free-list bookkeeping is simple enough to inline at each
/// call site; this is the one spot (piecewise CDF inversion) where a
/// generic helper pulls its weight.
#[inline]
pub fn find_interval<P>(size: usize, pred: P) -> usize
where
    P: Fn(usize) -> bool,
{
    let mut first = 0usize;
    let mut len = size;
    while len > 0 {
        let half = len >> 1;
        let middle = first + half;
        if pred(middle) {
            first = middle + 1;
            len -= half + 1;
        } else {
            len = half;
        }
    }
    clamp_t(first as isize - 1, 0, size as isize - 2) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_clamps_both_ends() {
        assert_eq!(clamp_t(-1.0, 0.0, 1.0), 0.0);
        assert_eq!(clamp_t(2.0, 0.0, 1.0), 1.0);
        assert_eq!(clamp_t(0.5, 0.0, 1.0), 0.5);
    }

    #[test]
    fn lerp_matches_endpoints() {
        assert_eq!(lerp(0.0, 1.0, 2.0), 1.0);
        assert_eq!(lerp(1.0, 1.0, 2.0), 2.0);
    }
}
