//! Propagators: `P(t) = exp(L·t)`.

use crate::math::liouvillian::Liouvillian;

/// Propagator for evolving under `l` for `t` seconds.
///
/// `t = 0` yields the identity.
pub fn propagator(l: &Liouvillian, t: f64) -> Liouvillian {
    if t == 0.0 {
        return Liouvillian::identity();
    }
    (l * t).exp()
}

/// `p^n` by repeated squaring.
pub fn matrix_power(p: &Liouvillian, mut n: u32) -> Liouvillian {
    let mut result = Liouvillian::identity();
    let mut base = *p;
    while n > 0 {
        if n & 1 == 1 {
            result = base * result;
        }
        base = base * base;
        n >>= 1;
    }
    result
}
