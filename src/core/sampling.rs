//! Draw random samples from a chosen probability distribution: sphere,
//! hemisphere, cosine-weighted hemisphere, disk, triangle, and MIS
//! weighting heuristics (spec.md §4.A). Each sampler is pure in its 2-D
//! uniform input `u ∈ [0,1)²`.

use crate::core::geometry::{Point2f, Vector3f};
use crate::core::pbrt::{find_interval, Float, INV_2_PI, PI};

#[inline]
pub fn uniform_sample_sphere(u: &Point2f) -> Vector3f {
    let z = 1.0 - 2.0 * u.x;
    let r = (1.0 - z * z).max(0.0).sqrt();
    let phi = 2.0 * PI * u.y;
    Vector3f::new(r * phi.cos(), r * phi.sin(), z)
}

#[inline]
pub fn uniform_sphere_pdf() -> Float {
    INV_2_PI * 0.5
}

#[inline]
pub fn uniform_sample_hemisphere(u: &Point2f) -> Vector3f {
    let z = u.x;
    let r = (1.0 - z * z).max(0.0).sqrt();
    let phi = 2.0 * PI * u.y;
    Vector3f::new(r * phi.cos(), r * phi.sin(), z)
}

#[inline]
pub fn uniform_hemisphere_pdf() -> Float {
    INV_2_PI
}

#[inline]
pub fn concentric_sample_disk(u: &Point2f) -> Point2f {
    let u_offset = Point2f::new(2.0 * u.x - 1.0, 2.0 * u.y - 1.0);
    if u_offset.x == 0.0 && u_offset.y == 0.0 {
        return Point2f::new(0.0, 0.0);
    }
    let (theta, r) = if u_offset.x.abs() > u_offset.y.abs() {
        (PI / 4.0 * (u_offset.y / u_offset.x), u_offset.x)
    } else {
        (
            PI / 2.0 - PI / 4.0 * (u_offset.x / u_offset.y),
            u_offset.y,
        )
    };
    Point2f::new(r * theta.cos(), r * theta.sin())
}

#[inline]
pub fn cosine_sample_hemisphere(u: &Point2f) -> Vector3f {
    let d = concentric_sample_disk(u);
    let z = (1.0 - d.x * d.x - d.y * d.y).max(0.0).sqrt();
    Vector3f::new(d.x, d.y, z)
}

#[inline]
pub fn cosine_hemisphere_pdf(cos_theta: Float) -> Float {
    cos_theta * std::f32::consts::FRAC_1_PI
}

/// Barycentrics for uniform-area triangle sampling (spec.md §4.C):
/// `(1 − √u1, √u1·(1 − u2), √u1·u2)`.
#[inline]
pub fn uniform_sample_triangle(u: &Point2f) -> (Float, Float) {
    let su0 = u.x.sqrt();
    (1.0 - su0, u.y * su0)
}

// ------------------------------------------------------------ MIS weights

#[inline]
pub fn balance_heuristic(nf: Float, pdf_f: Float, ng: Float, pdf_g: Float) -> Float {
    let denom = nf * pdf_f + ng * pdf_g;
    if denom == 0.0 {
        0.0
    } else {
        (nf * pdf_f) / denom
    }
}

#[inline]
pub fn power_heuristic(nf: Float, pdf_f: Float, ng: Float, pdf_g: Float) -> Float {
    let f = nf * pdf_f;
    let g = ng * pdf_g;
    let denom = f * f + g * g;
    if denom == 0.0 {
        0.0
    } else {
        (f * f) / denom
    }
}

// -------------------------------------------------------- Distribution1D

/// Piecewise-constant 1-D distribution used to importance sample a
/// tabulated function, e.g. a row of an environment map (spec.md §4.L —
/// backs the importance-sampled infinite light).
#[derive(Debug, Default, Clone)]
pub struct Distribution1D {
    pub func: Vec<Float>,
    pub cdf: Vec<Float>,
    pub func_int: Float,
}

impl Distribution1D {
    pub fn new(f: Vec<Float>) -> Self {
        let n = f.len();
        let mut cdf = Vec::with_capacity(n + 1);
        cdf.push(0.0);
        for i in 1..=n {
            let prev = cdf[i - 1];
            cdf.push(prev + f[i - 1] / n as Float);
        }
        let func_int = cdf[n];
        if func_int == 0.0 {
            for (i, item) in cdf.iter_mut().enumerate().skip(1).take(n) {
                *item = i as Float / n as Float;
            }
        } else {
            for item in cdf.iter_mut().skip(1).take(n) {
                *item /= func_int;
            }
        }
        Distribution1D { func: f, cdf, func_int }
    }

    pub fn count(&self) -> usize {
        self.func.len()
    }

    pub fn sample_continuous(&self, u: Float) -> (Float, Float, usize) {
        let offset = find_interval(self.cdf.len(), |i| self.cdf[i] <= u);
        let mut du = u - self.cdf[offset];
        if self.cdf[offset + 1] - self.cdf[offset] > 0.0 {
            du /= self.cdf[offset + 1] - self.cdf[offset];
        }
        let pdf = if self.func_int > 0.0 {
            self.func[offset] / self.func_int
        } else {
            0.0
        };
        ((offset as Float + du) / self.count() as Float, pdf, offset)
    }

    pub fn sample_discrete(&self, u: Float) -> (usize, Float) {
        let offset = find_interval(self.cdf.len(), |i| self.cdf[i] <= u);
        let pdf = if self.func_int > 0.0 {
            self.func[offset] / (self.func_int * self.count() as Float)
        } else {
            0.0
        };
        (offset, pdf)
    }

    pub fn discrete_pdf(&self, index: usize) -> Float {
        if self.func_int == 0.0 {
            0.0
        } else {
            self.func[index] / (self.func_int * self.count() as Float)
        }
    }
}

/// Piecewise-constant 2-D distribution over an equirectangular function
/// (e.g. environment-map luminance), built as marginal-over-conditional
/// rows. Grounded on `original_source/include/bulbit/sampling.h`'s
/// `Distribution2D` (spec.md §4.L).
#[derive(Debug, Clone)]
pub struct Distribution2D {
    conditional: Vec<Distribution1D>,
    marginal: Distribution1D,
    nu: usize,
    nv: usize,
}

impl Distribution2D {
    pub fn new(func: &[Float], nu: usize, nv: usize) -> Self {
        let mut conditional = Vec::with_capacity(nv);
        for v in 0..nv {
            let row = func[v * nu..(v + 1) * nu].to_vec();
            conditional.push(Distribution1D::new(row));
        }
        let marginal_func: Vec<Float> = conditional.iter().map(|d| d.func_int).collect();
        let marginal = Distribution1D::new(marginal_func);
        Distribution2D {
            conditional,
            marginal,
            nu,
            nv,
        }
    }

    pub fn sample_continuous(&self, u: &Point2f) -> (Point2f, Float) {
        let (d1, pdf1, v) = self.marginal.sample_continuous(u.y);
        let (d0, pdf0, _) = self.conditional[v].sample_continuous(u.x);
        (Point2f::new(d0, d1), pdf0 * pdf1)
    }

    pub fn pdf(&self, p: &Point2f) -> Float {
        let iu = ((p.x * self.nu as Float) as isize).clamp(0, self.nu as isize - 1) as usize;
        let iv = ((p.y * self.nv as Float) as isize).clamp(0, self.nv as isize - 1) as usize;
        if self.marginal.func_int == 0.0 {
            0.0
        } else {
            self.conditional[iv].func[iu] / self.marginal.func_int
        }
    }

    /// Mean of the tabulated function over the whole domain, used as the
    /// average-radiance term in an importance-sampled infinite light's
    /// `power` estimate.
    pub fn average(&self) -> Float {
        self.marginal.func_int
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cosine_hemisphere_pdf_averages_to_pi() {
        // S4: E[1/pdf] over CosineSampleHemisphere should converge to pi.
        let mut rng = crate::core::rng::Rng::default();
        let n = 200_000;
        let mut sum = 0.0;
        for _ in 0..n {
            let u = Point2f::new(rng.next_float(), rng.next_float());
            let w = cosine_sample_hemisphere(&u);
            let pdf = cosine_hemisphere_pdf(w.z);
            sum += 1.0 / pdf;
        }
        let mean = sum / n as Float;
        assert!((mean - PI).abs() / PI < 0.02, "mean={}", mean);
    }

    #[test]
    fn power_heuristic_sums_to_one_for_two_strategies() {
        // S8: balance/power weights at a single direction sum to 1.
        let pf = 2.0;
        let pg = 5.0;
        let wf = power_heuristic(1.0, pf, 1.0, pg);
        let wg = power_heuristic(1.0, pg, 1.0, pf);
        assert!((wf + wg - 1.0).abs() < 1e-6);
    }

    #[test]
    fn distribution1d_integrates_to_one() {
        let dist = Distribution1D::new(vec![1.0, 2.0, 3.0, 4.0]);
        let (_, pdf, _) = dist.sample_continuous(0.5);
        assert!(pdf > 0.0);
        assert!((dist.cdf[4] - 1.0).abs() < 1e-6);
    }
}
