//! Runge-Kutta stage tables.
//!
//! Kept separate from the step-size control and attempt-retry loop
//! ([`crate::evolve`]): this module only defines Butcher tableaus (`RK`
//! trait, `dormand.rs`, `fehlberg.rs`) and the stage-accumulation routine
//! that evaluates one of them, not the loop that decides whether a stage
//! is accepted.

mod dormand;
pub use self::dormand::*;
mod fehlberg;
pub use self::fehlberg::*;

/// Defines a Runge-Kutta method via its Butcher tableau.
///
/// Only explicit, embedded (adaptive) tableaus are supported: `b_coeffs`
/// must hold both the `b_i` and the embedded `b*_i` back to back, i.e. be
/// of length `2 * stages()`.
pub trait RK
where
    Self: Sized,
{
    /// Order of the higher-order solution used to advance the state.
    fn order() -> u8;

    /// Number of stages (`k_i` evaluations per step).
    fn stages() -> usize;

    /// Lower-triangular `a_ij` coefficients, row-major, flattened: row `i`
    /// (for `i` in `1..stages()`) holds `i` entries, so the total length is
    /// `stages() * (stages() - 1) / 2`.
    fn a_coeffs() -> &'static [f64];

    /// `b_i` followed by the embedded `b*_i`, length `2 * stages()`.
    fn b_coeffs() -> &'static [f64];
}

/// Advances one set of Runge-Kutta stages for an autonomous
/// `dy/dt = f(t, y)` over a flat `Vec<f64>` state (the width is only known
/// at runtime, since it depends on the orbiter count, so plain elementwise
/// `Vec<f64>` arithmetic is used here instead of `nalgebra`'s fixed-size
/// vector ops).
///
/// Returns `(next_state, error_estimate, k1)`, where `k1` is `dydt` at the
/// start of the step (handed to the step-size controller unchanged) and
/// `error_estimate[j] = h * sum_i (b_i - b*_i) * k_i[j]`.
pub fn rk_stage<T, F>(f: &F, t: f64, y: &[f64], h: f64) -> (Vec<f64>, Vec<f64>, Vec<f64>)
where
    T: RK,
    F: Fn(f64, &[f64]) -> Vec<f64>,
{
    let dim = y.len();
    let stages = T::stages();
    let a = T::a_coeffs();
    let b = T::b_coeffs();

    let mut k: Vec<Vec<f64>> = Vec::with_capacity(stages);
    k.push(f(t, y));

    let mut a_idx = 0usize;
    for _ in 0..(stages - 1) {
        let mut ci = 0.0;
        let mut wi = vec![0.0; dim];
        for kj in &k {
            let a_ij = a[a_idx];
            ci += a_ij;
            for d in 0..dim {
                wi[d] += a_ij * kj[d];
            }
            a_idx += 1;
        }
        let mut yi = vec![0.0; dim];
        for d in 0..dim {
            yi[d] = y[d] + h * wi[d];
        }
        k.push(f(t + ci * h, &yi));
    }

    let mut next_state = y.to_vec();
    let mut error_est = vec![0.0; dim];
    for (i, ki) in k.iter().enumerate() {
        let b_i = b[i];
        let b_i_star = b[i + stages];
        for d in 0..dim {
            next_state[d] += h * b_i * ki[d];
            error_est[d] += h * (b_i - b_i_star) * ki[d];
        }
    }

    (next_state, error_est, k[0].clone())
}
