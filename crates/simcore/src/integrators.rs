/// Smallest divisor any model is allowed to use.
pub const MIN_DIVISOR: f64 = 1e-6;

/// Floors a divisor at [`MIN_DIVISOR`] so a zero (or negative) mass, lag or
/// timestep yields a large but finite result instead of NaN/inf.
#[inline]
pub fn guarded_divisor(x: f64) -> f64 {
    x.max(MIN_DIVISOR)
}

/// Explicit Euler update: `x + rate * dt`.
///
/// Models call this once per state variable in their own order, so a model that
/// updates velocity first and then feeds the NEW velocity into position gets the
/// semi-implicit variant for free.
#[inline]
pub fn euler(x: f64, rate: f64, dt: f64) -> f64 {
    x + rate * dt
}
