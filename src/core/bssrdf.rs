//! Separable subsurface scattering profile (BSSRDF): gives exitant
//! radiance at a point given incident irradiance at a nearby point on
//! the same surface. Grounded in shape on the teacher's
//! `TabulatedBssrdf` (`sw`/`sp`/`pdf_sp`/axis-sampling split), but the
//! radial profile itself is the closed-form Christensen-Burley
//! normalized diffusion approximation rather than a tabulated/integrated
//! photon-beam diffusion table, so no probe-ray tracing against the
//! scene lives here — the integrator walks the profile with its own
//! BVH access (spec.md §4.G "Subsurface").

use std::f32::consts::PI;

use crate::core::geometry::Point3f;
use crate::core::pbrt::{Float, INV_PI};
use crate::core::reflection::fr_dielectric;
use crate::core::spectrum::Spectrum;

fn fresnel_moment1(eta: Float) -> Float {
    let eta2 = eta * eta;
    let eta3 = eta2 * eta;
    let eta4 = eta3 * eta;
    let eta5 = eta4 * eta;
    if eta < 1.0 {
        0.45966 - 1.73965 * eta + 3.37668 * eta2 - 3.904_945 * eta3 + 2.49277 * eta4 - 0.68441 * eta5
    } else {
        -4.61686 + 11.1136 * eta - 10.4646 * eta2 + 5.11455 * eta3 - 1.27198 * eta4 + 0.12746 * eta5
    }
}

/// Christensen-Burley normalized diffusion profile parameters, derived
/// once per BSSRDF instance from a diffuse mean free path `mfp` and an
/// albedo-fitted shape parameter `s`.
pub struct TabulatedBssrdf {
    pub point: Point3f,
    pub eta: Float,
    pub g: Float,
    pub d: Spectrum,
}

impl TabulatedBssrdf {
    pub fn new(eta: Float, g: Float, mfp: Spectrum, point: Point3f) -> Self {
        // shape parameter fit for an effective albedo near 0.5; extreme
        // albedos would need the full per-channel Burley fit.
        const SHAPE_PARAM: Float = 1.85;
        let d = mfp * (1.0 / SHAPE_PARAM);
        TabulatedBssrdf { point, eta, g, d }
    }

    /// Fresnel transmittance term at the exit point, weighted so the
    /// total diffuse transmittance integrates to one (spec.md §4.G).
    pub fn sw(&self, w_local_z: Float) -> Spectrum {
        let c = 1.0 - 2.0 * fresnel_moment1(1.0 / self.eta);
        Spectrum::new((1.0 - fr_dielectric(w_local_z, 1.0, self.eta)) / (c * PI))
    }

    pub fn pdf_sw(&self, w_local_z: Float) -> Float {
        w_local_z.abs() * INV_PI
    }

    /// Radial falloff `Sr(r)` per spectral channel, the Burley
    /// normalized diffusion profile: `(e^{-r/d} + e^{-r/(3d)}) / (8π·d·r)`.
    pub fn sr(&self, r: Float) -> Spectrum {
        let r = r.max(1e-6);
        let eval = |d: Float| -> Float {
            if d <= 0.0 {
                return 0.0;
            }
            ((-r / d).exp() + (-r / (3.0 * d)).exp()) / (8.0 * PI * d * r)
        };
        Spectrum::rgb(eval(self.d[0]), eval(self.d[1]), eval(self.d[2]))
    }

    /// Inverts the marginal radial CDF of the profile for one channel,
    /// returning a sample radius (spec.md §4.G, random-walk extension).
    pub fn sample_sr(&self, channel: usize, u: Float) -> Float {
        let d = self.d[channel].max(1e-6);
        // mixture of the two exponential terms, equal weight
        if u < 0.5 {
            let u = (u * 2.0).min(0.999_999);
            -d * (1.0 - u).ln()
        } else {
            let u = ((u - 0.5) * 2.0).min(0.999_999);
            -3.0 * d * (1.0 - u).ln()
        }
    }

    pub fn pdf_sr(&self, channel: usize, r: Float) -> Float {
        self.sr(r)[channel]
    }

    pub fn max_sample_radius(&self) -> Float {
        self.d.max_component() * 10.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_decreases_with_radius() {
        let bssrdf = TabulatedBssrdf::new(1.33, 0.0, Spectrum::new(1.0), Point3f::default());
        let near = bssrdf.sr(0.01).average();
        let far = bssrdf.sr(1.0).average();
        assert!(near > far);
    }

    #[test]
    fn fresnel_transmittance_is_nonnegative() {
        let bssrdf = TabulatedBssrdf::new(1.33, 0.0, Spectrum::new(1.0), Point3f::default());
        assert!(bssrdf.sw(0.7).average() >= 0.0);
    }
}
