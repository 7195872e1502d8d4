extern crate nalgebra as na;

use self::na::Vector3;

use crate::state::{
    self, read_vec3, BODY_AVEC_INDEX, BODY_A_INDEX, BODY_I_INDEX, BODY_K_INDEX, BODY_L_INDEX,
    BODY_M_INDEX, BODY_R_INDEX, BODY_SPIN_INDEX, BODY_TV_INDEX, CENTRAL_I_INDEX, CENTRAL_K_INDEX,
    CENTRAL_R_INDEX, CENTRAL_SPIN_INDEX, CENTRAL_TV_INDEX,
};

/// Step-size recommendation returned by [`SecularController::hadjust`],
/// named after GSL's `gsl_odeiv_control`-style `ODEiv` return values
/// (`Dec`/`Nil`/`Inc`, see `ordinary_differential_equations.rs` in the GSL
/// binding crate) since the algorithm below targets the same
/// `gsl_odeiv_control_secular_new` contract the original C source builds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepVerdict {
    /// The step should be retried with a smaller `h`. `h` has already been
    /// shrunk in place.
    Decrease,
    /// The step is acceptable as-is; `h` is unchanged.
    Unchanged,
    /// The step is acceptable and `h` has been grown in place for the next
    /// attempt.
    Increase,
}

const SAFETY: f64 = 0.9;
const DECREASE_THRESHOLD: f64 = 1.1;
const INCREASE_THRESHOLD: f64 = 0.5;
const MIN_STEP_RATIO: f64 = 0.2;
const MAX_STEP_RATIO: f64 = 5.0;

/// Keplerian mean motion of an orbiter around the central body, whose
/// gravitational parameter is normalized to 1.
fn mean_motion(mass: f64, semimajor_axis: f64) -> f64 {
    ((1.0 + mass) / semimajor_axis.powi(3)).sqrt()
}

/// A heterogeneous error-factor step-size controller.
///
/// Unlike a uniform relative/absolute tolerance blend, this controller
/// assembles one scalar error factor `M` out of a list of per-quantity
/// terms with different units and different notions of "error" (signed
/// invariant drift, relative error, absolute error, angular-momentum
/// normalized error), then gates the step on the worst offender. See
/// [`SecularController::hadjust`] for the full factor list.
#[derive(Clone, Copy, Debug)]
pub struct SecularController {
    /// Target error tolerance each per-quantity factor is measured against.
    pub eps: f64,
}

impl SecularController {
    pub fn new(eps: f64) -> Self {
        Self { eps }
    }

    /// Computes the worst-offender error factor `M` over `y`/`yerr` and
    /// recommends a verdict, adjusting `h` in place for `Decrease`/
    /// `Increase`.
    ///
    /// `y` is the accepted state the step was taken from, `yerr` is the
    /// stepper's local error estimate for this attempt (same layout as
    /// `y`), and `yprime` is `dy/dt` evaluated at the start of the step
    /// (same layout as `y`, currently unused by any term below but kept in
    /// the signature since GSL's `hadjust` takes it and a future term may
    /// need it).
    pub fn hadjust(&self, order: u8, y: &[f64], yerr: &[f64], _yprime: &[f64], h: &mut f64) -> StepVerdict {
        let n = state::num_orbiters(y.len());

        // Ltot = I_cb.spin_cb + sum_i (m_i.n_i.a_i^2.L_i + I_i.spin_i), the
        // total angular momentum that normalizes the spin error factors.
        let mut l_tot = read_vec3(y, CENTRAL_SPIN_INDEX) * y[CENTRAL_I_INDEX];
        for i in 0..n {
            let off = state::orbiter_offset(i);
            let mass = y[off + BODY_M_INDEX];
            let a = y[off + BODY_A_INDEX];
            let l = read_vec3(y, off + BODY_L_INDEX);
            let spin = read_vec3(y, off + BODY_SPIN_INDEX);
            let moment_of_inertia = y[off + BODY_I_INDEX];
            let n_i = mean_motion(mass, a);
            l_tot += l * (mass * n_i * a * a) + spin * moment_of_inertia;
        }
        let l_tot_mag = l_tot.norm().max(f64::MIN_POSITIVE);

        let mut m: f64 = 0.0;
        let mut bump = |factor: f64| {
            if factor.is_finite() {
                m = m.max(factor.abs() / self.eps);
            } else {
                m = f64::INFINITY;
            }
        };

        for i in 0..n {
            let off = state::orbiter_offset(i);

            let l = read_vec3(y, off + BODY_L_INDEX);
            let a = read_vec3(y, off + BODY_AVEC_INDEX);
            let l_err = read_vec3(yerr, off + BODY_L_INDEX);
            let a_err = read_vec3(yerr, off + BODY_AVEC_INDEX);

            // 1. Signed drift of the |L|^2 + |A|^2 = 1 shape invariant.
            bump(2.0 * (l.dot(&l_err) + a.dot(&a_err)));
            // 2. Signed drift of the L.A = 0 orthogonality invariant.
            bump(l.dot(&a_err) + a.dot(&l_err));

            // 3. Relative error in mass.
            relative(y[off + BODY_M_INDEX], yerr[off + BODY_M_INDEX], &mut bump);
            // 4. Relative error in semimajor axis.
            relative(y[off + BODY_A_INDEX], yerr[off + BODY_A_INDEX], &mut bump);
            // 5. Relative error in the viscous timescale, skipped when
            //    tV == 0 rather than letting a 0/0 division propagate NaN.
            let tv = y[off + BODY_TV_INDEX];
            if tv != 0.0 {
                bump(yerr[off + BODY_TV_INDEX] / tv);
            }
            // 6. Absolute error in the Love number.
            bump(yerr[off + BODY_K_INDEX]);
            // 7. Relative error in moment of inertia.
            relative(y[off + BODY_I_INDEX], yerr[off + BODY_I_INDEX], &mut bump);
            // 8. Relative error in radius.
            relative(y[off + BODY_R_INDEX], yerr[off + BODY_R_INDEX], &mut bump);
            // 9. Absolute error in |dL|.
            bump(l_err.norm());
            // 10. Absolute error in |dA|.
            bump(a_err.norm());
            // 11. Angular-momentum-normalized spin error.
            bump(read_vec3(yerr, off + BODY_SPIN_INDEX).norm() / l_tot_mag);
        }

        // Central body: four relative/absolute factors plus its own
        // angular-momentum-normalized spin error.
        relative(y[CENTRAL_I_INDEX], yerr[CENTRAL_I_INDEX], &mut bump);
        relative(y[CENTRAL_R_INDEX], yerr[CENTRAL_R_INDEX], &mut bump);
        bump(yerr[CENTRAL_K_INDEX]);
        let tv = y[CENTRAL_TV_INDEX];
        if tv != 0.0 {
            bump(yerr[CENTRAL_TV_INDEX] / tv);
        }
        bump(read_vec3(yerr, CENTRAL_SPIN_INDEX).norm() / l_tot_mag);

        if m > DECREASE_THRESHOLD {
            let scale = (SAFETY / m.powf(1.0 / f64::from(order))).max(MIN_STEP_RATIO);
            *h *= scale;
            StepVerdict::Decrease
        } else if m < INCREASE_THRESHOLD {
            let scale = (SAFETY / m.powf(1.0 / f64::from(order + 1))).min(MAX_STEP_RATIO);
            *h *= scale;
            StepVerdict::Increase
        } else {
            StepVerdict::Unchanged
        }
    }
}

/// Folds a relative-error term into `bump`, skipping quantities that are
/// exactly zero (where "relative" is meaningless) rather than dividing by
/// zero.
fn relative(value: f64, err: f64, bump: &mut impl FnMut(f64)) {
    if value != 0.0 {
        bump(err / value);
    }
}
