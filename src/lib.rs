//! Secular + tidal evolution of a hierarchical planetary system.
//!
//! Each orbiter is represented by Laplace-Runge-Lenz-like vectors (`L`,
//! `A`) rather than an instantaneous orbital phase (see [`state`]), and is
//! evolved by an orbit-averaged right-hand side ([`dynamics`]) built out of
//! two externally supplied analytic kernels ([`kernels`]). A bespoke
//! step-size controller ([`control`]) gates an explicit Runge-Kutta
//! stepper ([`propagators`], driven by [`evolve`]) using a heterogeneous
//! per-quantity error factor rather than a single scalar tolerance.

#[macro_use]
extern crate log;

pub mod control;
pub mod dynamics;
pub mod errors;
pub mod evolve;
pub mod kernels;
pub mod propagators;
pub mod state;

pub use control::{SecularController, StepVerdict};
pub use dynamics::SecularDynamics;
pub use errors::{SecularError, SecularResult};
pub use evolve::{IntegrationDetails, Stepper, StepperOpts};
pub use kernels::{AverageRhsKernel, KernelStatus, TidalRhsKernel};
pub use propagators::{rk_stage, Dormand45, RK, RKF45};
pub use state::{dim, pack, unpack, CentralBody, Orbiter};
