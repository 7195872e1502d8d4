//! Shared test fixtures: seeded random orbiter generation and a pair of
//! stub kernels used to exercise the integration pipeline without
//! depending on the (out-of-scope) analytic secular/tidal kernels.
//!
//! Orbiters are generated from a `rand_pcg` RNG seeded per test for
//! reproducible, portable random fixtures.

use nalgebra::Vector3;
use rand::distributions::{Distribution, Uniform};
use rand_pcg::Pcg64;

use secular_tides::{CentralBody, Orbiter};
use secular_tides::{AverageRhsKernel, KernelStatus, TidalRhsKernel};

pub fn seeded_rng(seed: u64) -> Pcg64 {
    use rand::SeedableRng;
    Pcg64::seed_from_u64(seed)
}

pub fn random_between(rng: &mut Pcg64, a: f64, b: f64) -> f64 {
    Uniform::new(a, b).sample(rng)
}

/// Builds a random orbiter with the given mass and semimajor axis, and a
/// random but valid `(L, A)` pair: `|L|^2 + |A|^2 = 1` with `L` along a
/// random orbit-normal direction and `A` orthogonal to it in the orbital
/// plane, matching `init_random_body`'s role in `checks.h`.
pub fn init_random_orbiter(rng: &mut Pcg64, mass: f64, semimajor_axis: f64) -> Orbiter {
    let ecc = random_between(rng, 0.0, 0.3);
    let l_mag = (1.0 - ecc * ecc).sqrt();

    let theta = random_between(rng, 0.0, std::f64::consts::PI);
    let phi = random_between(rng, 0.0, 2.0 * std::f64::consts::PI);
    let normal = Vector3::new(theta.sin() * phi.cos(), theta.sin() * phi.sin(), theta.cos());

    // Any unit vector orthogonal to `normal` works as the periapse
    // direction; Gram-Schmidt against an arbitrary helper vector.
    let helper = if normal.x.abs() < 0.9 {
        Vector3::new(1.0, 0.0, 0.0)
    } else {
        Vector3::new(0.0, 1.0, 0.0)
    };
    let periapse = (helper - normal * normal.dot(&helper)).normalize();

    Orbiter {
        mass,
        semimajor_axis,
        l_vec: normal * l_mag,
        a_vec: periapse * ecc,
        spin: Vector3::new(0.0, 0.0, random_between(rng, 1e-4, 1e-2)),
        moment_of_inertia: random_between(rng, 1e-6, 1e-4),
        radius: random_between(rng, 1e-5, 1e-3),
        love_number: random_between(rng, 0.05, 0.5),
        tidal_tau: random_between(rng, 1.0, 50.0),
    }
}

pub fn default_central_body() -> CentralBody {
    CentralBody {
        spin: Vector3::new(0.0, 0.0, 2e-3),
        moment_of_inertia: 0.07,
        radius: 4.65e-3,
        love_number: 0.03,
        tidal_tau: 1.0,
    }
}

/// A gravitational kernel that generates a rigid-body precession of `L`
/// and `A` about a fixed axis, scaled by the perturbing orbiter's mass and
/// inverse-cubed orbital separation. Because a rigid rotation preserves
/// every inner product of the vectors it acts on, this kernel keeps
/// `|L|^2 + |A|^2` and `L.A` invariant up to integration error alone,
/// which makes it useful for exercising the secular-invariant property
/// checks without the real analytic averaged kernel.
pub struct PrecessingAverage {
    pub axis: Vector3<f64>,
    pub strength: f64,
}

impl AverageRhsKernel for PrecessingAverage {
    fn average_rhs(
        &self,
        _eps: f64,
        bi: &Orbiter,
        bj: &Orbiter,
        _epsquad: f64,
        out: &mut [f64; secular_tides::state::ORBITER_BLOCK_WIDTH],
    ) -> KernelStatus {
        let rate = self.strength * bj.mass / bi.semimajor_axis.powi(3);
        let omega = self.axis * rate;
        let dl = omega.cross(&bi.l_vec);
        let da = omega.cross(&bi.a_vec);
        out[secular_tides::state::BODY_L_INDEX] = dl.x;
        out[secular_tides::state::BODY_L_INDEX + 1] = dl.y;
        out[secular_tides::state::BODY_L_INDEX + 2] = dl.z;
        out[secular_tides::state::BODY_AVEC_INDEX] = da.x;
        out[secular_tides::state::BODY_AVEC_INDEX + 1] = da.y;
        out[secular_tides::state::BODY_AVEC_INDEX + 2] = da.z;
        KernelStatus::Ok
    }
}

/// A tidal kernel that contributes nothing, used to isolate the
/// gravitational precession term in invariant-drift tests.
pub struct NullTidal;

impl TidalRhsKernel for NullTidal {
    fn tidal_rhs(
        &self,
        _bi: &Orbiter,
        _cb: &CentralBody,
        out_body: &mut [f64; secular_tides::state::ORBITER_BLOCK_WIDTH],
        out_spin_cb: &mut [f64; 3],
    ) {
        *out_body = [0.0; secular_tides::state::ORBITER_BLOCK_WIDTH];
        *out_spin_cb = [0.0; 3];
    }
}
