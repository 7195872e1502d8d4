extern crate nalgebra as na;

use self::na::Vector3;

/// The central body: mass is normalized away (its gravitational parameter
/// defines the unit system), so only spin/shape/tidal attributes remain.
///
/// Field order mirrors the flat-vector contract of [`CENTRAL_SPIN_INDEX`]
/// etc below: `spin(3) | moment_of_inertia | radius | love_number |
/// tidal_tau`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CentralBody {
    /// Angular velocity of the central body.
    pub spin: Vector3<f64>,
    /// Moment of inertia.
    pub moment_of_inertia: f64,
    /// Radius.
    pub radius: f64,
    /// Tidal Love number (dimensionless, unconstrained in sign).
    pub love_number: f64,
    /// Viscous (tidal lag) timescale. Non-negative; may be exactly zero.
    pub tidal_tau: f64,
}

/// One orbiting body, represented by its Laplace-Runge-Lenz-like secular
/// vectors rather than an instantaneous orbital phase.
///
/// `l_vec` has magnitude `sqrt(1 - e^2)` along the orbital angular momentum
/// direction; `a_vec` has magnitude `e` and points to periapse. The spin,
/// moment of inertia, radius, Love number, and viscous timescale fields
/// carry the additional state the tidal coupling evolves.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Orbiter {
    /// Mass, in units where the central body's GM is unity.
    pub mass: f64,
    /// Semi-major axis (must stay positive under truncation error).
    pub semimajor_axis: f64,
    /// Magnitude `sqrt(1 - e^2)`, direction = orbit normal.
    pub l_vec: Vector3<f64>,
    /// Magnitude `e`, direction = toward periapse.
    pub a_vec: Vector3<f64>,
    /// Angular velocity of the orbiter's own spin.
    pub spin: Vector3<f64>,
    /// Moment of inertia.
    pub moment_of_inertia: f64,
    /// Radius.
    pub radius: f64,
    /// Tidal Love number.
    pub love_number: f64,
    /// Viscous (tidal lag) timescale. Non-negative; may be exactly zero.
    pub tidal_tau: f64,
}

/// Width, in `f64` slots, of one orbiter's block in the flat state vector.
///
/// The bare `(m, a, L, A)` tuple the gravitational kernel operates on is
/// only 8 slots wide; this crate's orbiter additionally carries the
/// spin/shape/tidal attributes that the controller and pack/unpack
/// round-trips index into, so the *state-vector* block width is 15. See
/// `AVERAGE_RHS_WIDTH` below for the narrower width the gravitational
/// kernel itself touches.
pub const ORBITER_BLOCK_WIDTH: usize = 15;

/// Width of the `average_rhs` kernel's per-call output: the gravitational
/// secular interaction only ever changes `(m, a, L, A)`, never spin, shape,
/// or tidal attributes, so its contribution is zero-padded into the full
/// [`ORBITER_BLOCK_WIDTH`]-wide orbiter slice by [`crate::dynamics`].
pub const AVERAGE_RHS_WIDTH: usize = 8;

/// Width, in `f64` slots, of the central body's block in the flat state
/// vector.
pub const CENTRAL_BODY_WIDTH: usize = 7;

/// Offset, within an orbiter block, of `mass`.
pub const BODY_M_INDEX: usize = 0;
/// Offset, within an orbiter block, of `semimajor_axis`.
pub const BODY_A_INDEX: usize = 1;
/// Offset, within an orbiter block, of `l_vec` (width 3).
pub const BODY_L_INDEX: usize = 2;
/// Offset, within an orbiter block, of `a_vec` (width 3).
pub const BODY_AVEC_INDEX: usize = 5;
/// Offset, within an orbiter block, of `spin` (width 3).
pub const BODY_SPIN_INDEX: usize = 8;
/// Offset, within an orbiter block, of `moment_of_inertia`.
pub const BODY_I_INDEX: usize = 11;
/// Offset, within an orbiter block, of `radius`.
pub const BODY_R_INDEX: usize = 12;
/// Offset, within an orbiter block, of `love_number`.
pub const BODY_K_INDEX: usize = 13;
/// Offset, within an orbiter block, of `tidal_tau`.
pub const BODY_TV_INDEX: usize = 14;

/// Offset, within the central body's block, of `spin` (width 3).
pub const CENTRAL_SPIN_INDEX: usize = 0;
/// Offset, within the central body's block, of `moment_of_inertia`.
pub const CENTRAL_I_INDEX: usize = 3;
/// Offset, within the central body's block, of `radius`.
pub const CENTRAL_R_INDEX: usize = 4;
/// Offset, within the central body's block, of `love_number`.
pub const CENTRAL_K_INDEX: usize = 5;
/// Offset, within the central body's block, of `tidal_tau`.
pub const CENTRAL_TV_INDEX: usize = 6;

/// Returns the length of the flat state vector for `n` orbiters.
///
/// `dim(n) == n * ORBITER_BLOCK_WIDTH + CENTRAL_BODY_WIDTH`.
pub fn dim(n: usize) -> usize {
    n * ORBITER_BLOCK_WIDTH + CENTRAL_BODY_WIDTH
}

/// Returns the index, within the flat vector, at which orbiter `i`'s block
/// begins.
pub fn orbiter_offset(i: usize) -> usize {
    CENTRAL_BODY_WIDTH + i * ORBITER_BLOCK_WIDTH
}

fn write_vec3(y: &mut [f64], offset: usize, v: &Vector3<f64>) {
    y[offset] = v.x;
    y[offset + 1] = v.y;
    y[offset + 2] = v.z;
}

/// Reads a `Vector3` out of a flat buffer at `offset`. Exposed crate-wide so
/// [`crate::control`] can read the same named offsets out of `y`/`yerr`/
/// `yprime` buffers without duplicating the layout contract.
pub(crate) fn read_vec3(y: &[f64], offset: usize) -> Vector3<f64> {
    Vector3::new(y[offset], y[offset + 1], y[offset + 2])
}

/// Returns the number of orbiters encoded in a flat state vector of the
/// given length.
pub fn num_orbiters(y_len: usize) -> usize {
    (y_len - CENTRAL_BODY_WIDTH) / ORBITER_BLOCK_WIDTH
}

fn central_body_to_vector(cb: &CentralBody, y: &mut [f64]) {
    write_vec3(y, CENTRAL_SPIN_INDEX, &cb.spin);
    y[CENTRAL_I_INDEX] = cb.moment_of_inertia;
    y[CENTRAL_R_INDEX] = cb.radius;
    y[CENTRAL_K_INDEX] = cb.love_number;
    y[CENTRAL_TV_INDEX] = cb.tidal_tau;
}

fn vector_to_central_body(y: &[f64]) -> CentralBody {
    CentralBody {
        spin: read_vec3(y, CENTRAL_SPIN_INDEX),
        moment_of_inertia: y[CENTRAL_I_INDEX],
        radius: y[CENTRAL_R_INDEX],
        love_number: y[CENTRAL_K_INDEX],
        tidal_tau: y[CENTRAL_TV_INDEX],
    }
}

fn body_to_vector(b: &Orbiter, y: &mut [f64]) {
    y[BODY_M_INDEX] = b.mass;
    y[BODY_A_INDEX] = b.semimajor_axis;
    write_vec3(y, BODY_L_INDEX, &b.l_vec);
    write_vec3(y, BODY_AVEC_INDEX, &b.a_vec);
    write_vec3(y, BODY_SPIN_INDEX, &b.spin);
    y[BODY_I_INDEX] = b.moment_of_inertia;
    y[BODY_R_INDEX] = b.radius;
    y[BODY_K_INDEX] = b.love_number;
    y[BODY_TV_INDEX] = b.tidal_tau;
}

fn vector_to_body(y: &[f64]) -> Orbiter {
    Orbiter {
        mass: y[BODY_M_INDEX],
        semimajor_axis: y[BODY_A_INDEX],
        l_vec: read_vec3(y, BODY_L_INDEX),
        a_vec: read_vec3(y, BODY_AVEC_INDEX),
        spin: read_vec3(y, BODY_SPIN_INDEX),
        moment_of_inertia: y[BODY_I_INDEX],
        radius: y[BODY_R_INDEX],
        love_number: y[BODY_K_INDEX],
        tidal_tau: y[BODY_TV_INDEX],
    }
}

/// Packs the central body and orbiters into a freshly allocated flat
/// vector of length `dim(orbiters.len())`.
///
/// Touches every slot exactly once; `unpack(&pack(cb, bs)) == (cb, bs)`
/// componentwise for any well-formed state (see the `pack_unpack_identity`
/// test).
pub fn pack(cb: &CentralBody, orbiters: &[Orbiter]) -> Vec<f64> {
    let mut y = vec![0.0; dim(orbiters.len())];
    central_body_to_vector(cb, &mut y);
    for (i, b) in orbiters.iter().enumerate() {
        body_to_vector(b, &mut y[orbiter_offset(i)..orbiter_offset(i) + ORBITER_BLOCK_WIDTH]);
    }
    y
}

/// Unpacks a flat state vector of length `dim(n)` into a central body plus
/// `n` orbiters. Panics (via slice indexing) if `y.len()` does not match
/// `dim(n)` for any `n` -- callers own the contract that `y` was produced
/// by `pack` or a same-shaped integrator buffer.
pub fn unpack(y: &[f64]) -> (CentralBody, Vec<Orbiter>) {
    let n = num_orbiters(y.len());
    let cb = vector_to_central_body(y);
    let orbiters = (0..n)
        .map(|i| vector_to_body(&y[orbiter_offset(i)..orbiter_offset(i) + ORBITER_BLOCK_WIDTH]))
        .collect();
    (cb, orbiters)
}
