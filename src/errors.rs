use thiserror::Error;

/// Errors surfaced by the secular-tidal core.
///
/// One variant per distinguishable failure mode, each carrying just
/// enough context to be actionable.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum SecularError {
    /// `average_rhs` reported non-convergence for at least one `(i, j)` pair
    /// during a single right-hand-side evaluation.
    #[error("average_rhs failed to converge for at least one orbiter pair")]
    KernelFailure,

    /// `tidal_rhs` produced a non-finite component (NaN or infinite) in
    /// either the per-orbiter derivative or the central-spin derivative.
    #[error("tidal_rhs produced a non-finite derivative for orbiter {orbiter}")]
    NonFiniteTidalOutput {
        /// Index of the orbiter whose tidal contribution was non-finite.
        orbiter: usize,
    },

    /// The stepper could not find an acceptable step size before `h` fell
    /// below the configured minimum.
    #[error("step size underflowed below the configured minimum ({h_min:e})")]
    StepSizeUnderflow {
        /// The configured floor the step size was not allowed to cross.
        h_min: f64,
    },

    /// The stepper exhausted its configured retry budget without the
    /// controller returning anything but `Decrease`.
    #[error("exceeded {max_attempts} attempts without an accepted step")]
    MaxAttemptsExceeded {
        /// The configured attempt budget.
        max_attempts: u32,
    },
}

/// Convenience alias used throughout the crate.
pub type SecularResult<T> = Result<T, SecularError>;
