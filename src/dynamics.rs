extern crate nalgebra as na;

use std::sync::Arc;

use self::na::Vector3;
use rayon::prelude::*;

use crate::kernels::{AverageRhsKernel, KernelStatus, TidalRhsKernel};
use crate::state::{self, CentralBody, Orbiter, CENTRAL_SPIN_INDEX, ORBITER_BLOCK_WIDTH};

fn combine(a: KernelStatus, b: KernelStatus) -> KernelStatus {
    if a == KernelStatus::BadFunction || b == KernelStatus::BadFunction {
        KernelStatus::BadFunction
    } else {
        KernelStatus::Ok
    }
}

/// Combines two partitions' "first orbiter with non-finite tidal output"
/// accumulators, preferring the lower index for determinism across thread
/// scheduling.
fn combine_tidal_failure(a: Option<usize>, b: Option<usize>) -> Option<usize> {
    match (a, b) {
        (Some(x), Some(y)) => Some(x.min(y)),
        (Some(x), None) => Some(x),
        (None, Some(y)) => Some(y),
        (None, None) => None,
    }
}

/// The right-hand-side assembler `F(t, y) -> dy/dt`.
///
/// Captures `(eps, epsquad)` plus the two pluggable kernel contracts of
/// [`crate::kernels`]. `N` is not stored -- it is read off `y.len()` on
/// each call, since it must always match the state vector being
/// differentiated anyway.
#[derive(Clone)]
pub struct SecularDynamics {
    average: Arc<dyn AverageRhsKernel>,
    tidal: Arc<dyn TidalRhsKernel>,
    /// Gravitational softening length threaded into `average_rhs`.
    pub eps: f64,
    /// Relative quadrature tolerance threaded into `average_rhs`'s
    /// internal integration.
    pub epsquad: f64,
}

impl SecularDynamics {
    /// Builds an RHS assembler over the given kernel implementations.
    pub fn new(
        average: Arc<dyn AverageRhsKernel>,
        tidal: Arc<dyn TidalRhsKernel>,
        eps: f64,
        epsquad: f64,
    ) -> Self {
        Self {
            average,
            tidal,
            eps,
            epsquad,
        }
    }

    /// Computes `dy/dt` for the autonomous secular-tidal system.
    ///
    /// `t` is accepted but unused: the system has no explicit time
    /// dependence, so this is present purely to match the stepper's
    /// expected `Fn(f64, &[f64]) -> _` signature.
    ///
    /// Zeroes the output, then fans out over orbiters in parallel: each
    /// iteration owns its own output slice exclusively and only ever reads
    /// the central body and orbiter `j != i`. The shared central-spin
    /// derivative and the overall kernel status are reduced from
    /// per-iteration thread-local accumulators after the parallel region,
    /// rather than written with atomics.
    ///
    /// The returned `Option<usize>` names the lowest-indexed orbiter whose
    /// `tidal_rhs` produced a non-finite component, distinguishing that
    /// failure mode from an `average_rhs` non-convergence (both still fold
    /// into the same overall [`KernelStatus::BadFunction`]).
    pub fn eom(&self, _t: f64, y: &[f64]) -> (Vec<f64>, KernelStatus, Option<usize>) {
        let (cb, orbiters) = state::unpack(y);
        let n = orbiters.len();

        let mut dydt = vec![0.0; y.len()];
        let (central_out, orbiters_out) = dydt.split_at_mut(state::CENTRAL_BODY_WIDTH);

        let (spin_accum, status, tidal_failure) = orbiters_out
            .par_chunks_mut(ORBITER_BLOCK_WIDTH)
            .enumerate()
            .fold(
                || (Vector3::<f64>::zeros(), KernelStatus::Ok, None),
                |(spin_acc, status_acc, fail_acc), (i, chunk)| {
                    self.accumulate_orbiter(i, &cb, &orbiters, n, chunk, spin_acc, status_acc, fail_acc)
                },
            )
            .reduce(
                || (Vector3::<f64>::zeros(), KernelStatus::Ok, None),
                |(s1, st1, f1), (s2, st2, f2)| (s1 + s2, combine(st1, st2), combine_tidal_failure(f1, f2)),
            );

        for k in 0..3 {
            central_out[CENTRAL_SPIN_INDEX + k] += spin_accum[k];
        }

        if status == KernelStatus::BadFunction {
            warn!("kernel failure while assembling dy/dt for {} orbiters", n);
        }

        (dydt, status, tidal_failure)
    }

    /// Computes orbiter `i`'s full contribution (pairwise gravity against
    /// every `j != i`, plus tides) and folds it into `chunk` (orbiter `i`'s
    /// exclusive output slice) and the running central-spin / status /
    /// tidal-failure accumulators.
    fn accumulate_orbiter(
        &self,
        i: usize,
        cb: &CentralBody,
        orbiters: &[Orbiter],
        n: usize,
        chunk: &mut [f64],
        mut spin_acc: Vector3<f64>,
        mut status_acc: KernelStatus,
        mut fail_acc: Option<usize>,
    ) -> (Vector3<f64>, KernelStatus, Option<usize>) {
        let bi = orbiters[i];
        let mut total = [0.0f64; ORBITER_BLOCK_WIDTH];

        for (j, bj) in orbiters.iter().enumerate() {
            if j == i {
                continue;
            }
            let mut rhs = [0.0f64; ORBITER_BLOCK_WIDTH];
            let status = self.average.average_rhs(self.eps, &bi, bj, self.epsquad, &mut rhs);
            if status == KernelStatus::BadFunction {
                status_acc = KernelStatus::BadFunction;
            }
            for k in 0..ORBITER_BLOCK_WIDTH {
                total[k] += rhs[k];
            }
        }
        debug_assert!(n == orbiters.len());

        let mut tidal_body = [0.0f64; ORBITER_BLOCK_WIDTH];
        let mut dspin = [0.0f64; 3];
        self.tidal.tidal_rhs(&bi, cb, &mut tidal_body, &mut dspin);

        if tidal_body.iter().chain(dspin.iter()).any(|v| !v.is_finite()) {
            status_acc = KernelStatus::BadFunction;
            fail_acc = combine_tidal_failure(fail_acc, Some(i));
        }
        for k in 0..ORBITER_BLOCK_WIDTH {
            total[k] += tidal_body[k];
        }

        for k in 0..ORBITER_BLOCK_WIDTH {
            chunk[k] += total[k];
        }
        spin_acc += Vector3::new(dspin[0], dspin[1], dspin[2]);

        (spin_acc, status_acc, fail_acc)
    }
}
