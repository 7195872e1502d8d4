use crate::state::{CentralBody, Orbiter, ORBITER_BLOCK_WIDTH};

/// Status returned by [`AverageRhsKernel::average_rhs`], mirroring GSL's
/// `GSL_SUCCESS` / `GSL_EBADFUNC` convention for an ODE right-hand side.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KernelStatus {
    /// The kernel converged and `out` holds a valid derivative.
    Ok,
    /// Internal quadrature failed to converge; `out` must not be trusted.
    BadFunction,
}

/// Contract for the orbit-averaged pairwise gravitational interaction
/// between two orbiters.
///
/// This is an external collaborator: its analytic derivation and internal
/// quadrature are implemented elsewhere. Only the contract is declared
/// here so [`crate::dynamics::SecularDynamics`] can fan out over
/// `Arc<dyn AverageRhsKernel + Send + Sync>` implementations without
/// needing to know their internals.
///
/// Implementations must not mutate `bi` or `bj`, and must not write
/// anything into `out` beyond the first [`crate::state::AVERAGE_RHS_WIDTH`]
/// slots: the orbit-averaged gravitational interaction can only change
/// `(mass, semimajor_axis, l_vec, a_vec)`, never spin, shape, or tidal
/// attributes.
pub trait AverageRhsKernel: Send + Sync {
    /// Writes orbiter `i`'s derivative due to orbiter `j`'s gravity, with
    /// softening length `eps` and internal quadrature tolerance
    /// `epsquad`, into `out`. Returns [`KernelStatus::BadFunction`] if the
    /// internal quadrature failed to converge, in which case `out` must be
    /// treated as garbage by the caller.
    fn average_rhs(
        &self,
        eps: f64,
        bi: &Orbiter,
        bj: &Orbiter,
        epsquad: f64,
        out: &mut [f64; ORBITER_BLOCK_WIDTH],
    ) -> KernelStatus;
}

/// Contract for the analytic tidal contribution an orbiter's equilibrium
/// tide raises on itself and on the central body's spin.
///
/// Also an external collaborator; only the contract is declared here.
/// Implementations must produce finite output whenever `bi`'s and `cb`'s
/// invariants hold -- non-finite output is treated as a kernel failure by
/// [`crate::dynamics::SecularDynamics`], not validated here.
pub trait TidalRhsKernel: Send + Sync {
    /// Writes the tidal contribution to orbiter `bi`'s per-body slots into
    /// `out_body`, and the resulting central-body spin derivative into
    /// `out_spin_cb`.
    fn tidal_rhs(
        &self,
        bi: &Orbiter,
        cb: &CentralBody,
        out_body: &mut [f64; ORBITER_BLOCK_WIDTH],
        out_spin_cb: &mut [f64; 3],
    );
}
