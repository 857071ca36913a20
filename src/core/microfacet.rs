//! GGX / Trowbridge-Reitz microfacet distribution: NDF, Smith masking-
//! shadowing, visible-normal sampling. Grounded on
//! `original_source/include/bulbit/microfacet.h` (spec.md §4.A, §4.G).

use crate::core::geometry::{Point2f, Vector3f};
use crate::core::pbrt::{Float, DEFAULT_REFLECTANCE, MIN_ALPHA, PI};
use crate::core::spectrum::Spectrum;

#[inline]
pub fn roughness_to_alpha(roughness: Float) -> Float {
    (roughness * roughness).max(MIN_ALPHA)
}

#[inline]
pub fn f0_from_basecolor(basecolor: Spectrum, metallic: Float) -> Spectrum {
    Spectrum::new(DEFAULT_REFLECTANCE) * (1.0 - metallic) + basecolor * metallic
}

#[inline]
pub fn fresnel_schlick(f0: Spectrum, cos_theta: Float) -> Spectrum {
    let m = (1.0 - cos_theta).max(0.0).min(1.0);
    f0 + (Spectrum::new(1.0) - f0) * (m * m * m * m * m)
}

/// Trowbridge-Reitz normal distribution function, spec.md §4.A:
/// `D = α² / (π·(NoH²·(α²−1) + 1)²)` with a small ε guard.
#[inline]
pub fn d_ggx(n_o_h: Float, alpha2: Float) -> Float {
    let b = n_o_h * n_o_h * (alpha2 - 1.0) + 1.0;
    alpha2 / (PI * b * b + 1e-7)
}

#[inline]
pub fn g1_smith(n_o_v: Float, alpha2: Float) -> Float {
    2.0 * n_o_v / (n_o_v + (alpha2 + (1.0 - alpha2) * n_o_v * n_o_v).sqrt())
}

/// Height-correlated Smith masking-shadowing term, spec.md §4.A.
#[inline]
pub fn g2_smith_correlated(n_o_v: Float, n_o_l: Float, alpha2: Float) -> Float {
    let g1 = n_o_v * (alpha2 + (1.0 - alpha2) * n_o_l * n_o_l).sqrt();
    let g2 = n_o_l * (alpha2 + (1.0 - alpha2) * n_o_v * n_o_v).sqrt();
    2.0 * n_o_l * n_o_v / (g1 + g2)
}

/// Visibility term `G2 / (4·NoV·NoL)`, precomputed to cancel the Cook-
/// Torrance denominator directly.
#[inline]
pub fn v_smith_correlated(n_o_v: Float, n_o_l: Float, alpha2: Float) -> Float {
    let g1 = n_o_v * (alpha2 + (1.0 - alpha2) * n_o_l * n_o_l).sqrt();
    let g2 = n_o_l * (alpha2 + (1.0 - alpha2) * n_o_v * n_o_v).sqrt();
    0.5 / (g1 + g2)
}

/// Sample a half-vector from the (non-visible) GGX distribution, in the
/// local shading frame where `+z` is the normal.
pub fn sample_ggx_distribution(alpha_x: Float, alpha_y: Float, u: &Point2f) -> Vector3f {
    let phi = 2.0 * PI * u.x;
    let alpha2 = (alpha_x * alpha_y).max(1e-12);
    let tan_theta2 = alpha2 * u.y / (1.0 - u.y).max(1e-12);
    let cos_theta = 1.0 / (1.0 + tan_theta2).sqrt();
    let sin_theta = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();
    Vector3f::new(sin_theta * phi.cos(), sin_theta * phi.sin(), cos_theta)
}

pub fn ggx_distribution_pdf(wh: &Vector3f, alpha2: Float) -> Float {
    d_ggx(wh.z, alpha2) * wh.z.abs()
}

/// Visible-normal sampling, spherical-caps parameterization (Dupuy &
/// Benyoub 2023), the primary VNDF sampler per spec.md §4.A.
pub fn sample_ggx_vndf_spherical_caps(wo: &Vector3f, alpha_x: Float, alpha_y: Float, u: &Point2f) -> Vector3f {
    let wo_std = Vector3f::new(wo.x * alpha_x, wo.y * alpha_y, wo.z).normalize();
    let wo_std = if wo_std.z < 0.0 { -wo_std } else { wo_std };

    let phi = 2.0 * PI * u.x;
    let z = (1.0 - u.y) * (1.0 + wo_std.z) - wo_std.z;
    let sin_theta = (1.0 - z * z).max(0.0).sqrt();
    let x = sin_theta * phi.cos();
    let y = sin_theta * phi.sin();
    let c = Vector3f::new(x, y, z);

    let wh_std = c + wo_std;
    Vector3f::new(wh_std.x * alpha_x, wh_std.y * alpha_y, wh_std.z.max(1e-9)).normalize()
}

/// Visible-normal sampling, Heitz 2018 reprojection form, offered as the
/// alternate per spec.md §4.A.
pub fn sample_ggx_vndf_heitz(wo: &Vector3f, alpha_x: Float, alpha_y: Float, u: &Point2f) -> Vector3f {
    let vh = Vector3f::new(wo.x * alpha_x, wo.y * alpha_y, wo.z).normalize();

    let lensq = vh.x * vh.x + vh.y * vh.y;
    let t1 = if lensq > 0.0 {
        Vector3f::new(-vh.y, vh.x, 0.0) / lensq.sqrt()
    } else {
        Vector3f::new(1.0, 0.0, 0.0)
    };
    let t2 = crate::core::geometry::vec3_cross_vec3f(&vh, &t1);

    let r = u.x.sqrt();
    let phi = 2.0 * PI * u.y;
    let p1 = r * phi.cos();
    let mut p2 = r * phi.sin();
    let s = 0.5 * (1.0 + vh.z);
    p2 = (1.0 - s) * (1.0 - p1 * p1).max(0.0).sqrt() + s * p2;

    let nh = t1 * p1 + t2 * p2 + vh * (1.0 - p1 * p1 - p2 * p2).max(0.0).sqrt();
    Vector3f::new(nh.x * alpha_x, nh.y * alpha_y, nh.z.max(1e-9)).normalize()
}

/// PDF of the visible-normal half-vector distribution, consistent with
/// either VNDF sampler above: `D·G1·|VoH| / |VoN|`, converted to a
/// directional PDF for the reflected sample.
pub fn ggx_vndf_pdf(wo: &Vector3f, wh: &Vector3f, alpha2: Float) -> Float {
    let n_o_v = wo.z.abs();
    if n_o_v <= 0.0 {
        return 0.0;
    }
    let g1 = g1_smith(n_o_v, alpha2);
    let v_o_h = crate::core::geometry::vec3_dot_vec3f(wo, wh).abs();
    d_ggx(wh.z, alpha2) * g1 * v_o_h / n_o_v
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roughness_to_alpha_is_floored() {
        assert!(roughness_to_alpha(0.0) >= MIN_ALPHA);
        assert!((roughness_to_alpha(1.0) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn d_ggx_peaks_at_normal_incidence() {
        let alpha2 = roughness_to_alpha(0.3).powi(2);
        let at_normal = d_ggx(1.0, alpha2);
        let off_normal = d_ggx(0.2, alpha2);
        assert!(at_normal > off_normal);
    }
}
