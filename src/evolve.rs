use std::cell::Cell;
use std::marker::PhantomData;

use crate::control::{SecularController, StepVerdict};
use crate::dynamics::SecularDynamics;
use crate::errors::{SecularError, SecularResult};
use crate::kernels::KernelStatus;
use crate::propagators::{rk_stage, RK};

/// Options bounding a [`Stepper`]'s adaptive behavior. There is no
/// fixed-step mode: this system is always adaptively stepped, and the
/// tolerance lives on [`SecularController`] rather than here.
#[derive(Clone, Copy, Debug)]
pub struct StepperOpts {
    /// Initial step size to attempt before any adaptation has occurred.
    pub init_step: f64,
    /// Floor below which the step size must never fall.
    pub min_step: f64,
    /// Ceiling the step size is clamped to after an `Increase` verdict.
    pub max_step: f64,
    /// Target error tolerance handed to [`SecularController`].
    pub eps: f64,
    /// Maximum number of attempts per call to [`Stepper::step`] before
    /// giving up with [`SecularError::MaxAttemptsExceeded`].
    pub max_attempts: u32,
}

impl Default for StepperOpts {
    /// Defaults scaled to this crate's dimensionless unit system.
    fn default() -> Self {
        StepperOpts {
            init_step: 1e-3,
            min_step: 1e-12,
            max_step: 10.0,
            eps: 1e-10,
            max_attempts: 50,
        }
    }
}

/// Details of the most recently accepted step.
#[derive(Clone, Copy, Debug)]
pub struct IntegrationDetails {
    /// Step size actually taken to produce the accepted state.
    pub step: f64,
    /// Controller verdict that accepted the step (`Unchanged` or
    /// `Increase` -- a `Decrease` verdict is always retried internally and
    /// never surfaces here).
    pub verdict: StepVerdict,
    /// Number of attempts consumed to find an acceptable step.
    pub attempts: u32,
}

/// Drives one Runge-Kutta method (`T`) against a [`SecularDynamics`] right-
/// hand side, gated by a [`SecularController`].
///
/// Runs an attempt-retry loop around a single RK stage evaluation: the
/// accept/reject/grow decision comes from the heterogeneous controller
/// rather than a single scalar tolerance comparison.
pub struct Stepper<'a, T: RK> {
    dynamics: &'a SecularDynamics,
    controller: SecularController,
    opts: StepperOpts,
    step_size: f64,
    details: IntegrationDetails,
    _method: PhantomData<T>,
}

impl<'a, T: RK> Stepper<'a, T> {
    pub fn new(dynamics: &'a SecularDynamics, controller: SecularController, opts: StepperOpts) -> Self {
        Stepper {
            dynamics,
            controller,
            step_size: opts.init_step,
            opts,
            details: IntegrationDetails {
                step: 0.0,
                verdict: StepVerdict::Unchanged,
                attempts: 0,
            },
            _method: PhantomData,
        }
    }

    /// Borrow the details of the most recently accepted step.
    pub fn latest_details(&self) -> &IntegrationDetails {
        &self.details
    }

    /// The step size that will be attempted on the next call.
    pub fn step_size(&self) -> f64 {
        self.step_size
    }

    /// Advances `y` (at time `t`) by one accepted step.
    ///
    /// Retries internally on `Decrease` verdicts, shrinking `step_size`
    /// each time, up to `opts.max_attempts`. Returns the new time and
    /// state on success; on any error, `y` is left conceptually untouched
    /// (nothing is written back into caller-owned state, since this
    /// method takes `y` by reference and returns a fresh `Vec`).
    pub fn step(&mut self, t: f64, y: &[f64]) -> SecularResult<(f64, Vec<f64>)> {
        let mut attempts = 0u32;
        loop {
            attempts += 1;
            if attempts > self.opts.max_attempts {
                warn!("maximum number of attempts reached ({})", self.opts.max_attempts);
                return Err(SecularError::MaxAttemptsExceeded {
                    max_attempts: self.opts.max_attempts,
                });
            }

            let bad = Cell::new(false);
            let tidal_failure: Cell<Option<usize>> = Cell::new(None);
            let f = |tt: f64, yy: &[f64]| {
                let (dydt, status, failed_orbiter) = self.dynamics.eom(tt, yy);
                if status == KernelStatus::BadFunction {
                    bad.set(true);
                    if tidal_failure.get().is_none() {
                        tidal_failure.set(failed_orbiter);
                    }
                }
                dydt
            };

            let h = self.step_size;
            let (next_state, error_est, k1) = rk_stage::<T, _>(&f, t, y, h);
            if bad.get() {
                return Err(match tidal_failure.get() {
                    Some(orbiter) => SecularError::NonFiniteTidalOutput { orbiter },
                    None => SecularError::KernelFailure,
                });
            }

            let mut h_next = h;
            let verdict = self
                .controller
                .hadjust(T::order(), &next_state, &error_est, &k1, &mut h_next);

            match verdict {
                StepVerdict::Decrease => {
                    if h_next < self.opts.min_step {
                        return Err(SecularError::StepSizeUnderflow {
                            h_min: self.opts.min_step,
                        });
                    }
                    self.step_size = h_next;
                }
                StepVerdict::Unchanged | StepVerdict::Increase => {
                    self.step_size = h_next.min(self.opts.max_step);
                    self.details = IntegrationDetails {
                        step: h,
                        verdict,
                        attempts,
                    };
                    return Ok((t + h, next_state));
                }
            }
        }
    }
}
