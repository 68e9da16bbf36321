//! Two-site Liouvillian for an amide 1H–15N spin pair.
//!
//! Each exchanging state carries six product operators:
//!
//! ```text
//! [Hx, Hy, Hz, 2HxNz, 2HyNz, 2HzNz]
//! ```
//!
//! State A occupies rows/columns `0..6`, state B `6..12`. Magnetization evolves
//! as `dM/dt = L·M`, so a relaxation rate `R` appears as `-R` on the diagonal.

use nalgebra::{SMatrix, SVector};

/// Operators per state.
pub const STATE_DIM: usize = 6;
/// Full basis size (two states).
pub const DIM: usize = 2 * STATE_DIM;

pub type Liouvillian = SMatrix<f64, DIM, DIM>;
pub type Magnetization = SVector<f64, DIM>;

/// Exchanging conformational state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    A,
    B,
}

impl State {
    pub const BOTH: [State; 2] = [State::A, State::B];

    fn base(self) -> usize {
        match self {
            State::A => 0,
            State::B => STATE_DIM,
        }
    }
}

/// Product operator within one state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Component {
    Hx,
    Hy,
    Hz,
    /// 2HxNz
    HxNz,
    /// 2HyNz
    HyNz,
    /// 2HzNz
    HzNz,
}

impl Component {
    /// Row/column of this operator for the given state.
    pub fn index(self, state: State) -> usize {
        let local = match self {
            Component::Hx => 0,
            Component::Hy => 1,
            Component::Hz => 2,
            Component::HxNz => 3,
            Component::HyNz => 4,
            Component::HzNz => 5,
        };
        state.base() + local
    }
}

/// Coherent and relaxation terms of one state, already in rad/s and s⁻¹.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SiteTerms {
    /// 1H offset from the carrier (rad/s).
    pub offset: f64,
    /// `π·J_HN` (rad/s).
    pub pi_j: f64,
    /// In-phase transverse 1H relaxation.
    pub r_hxy: f64,
    /// Anti-phase transverse relaxation (2HxyNz).
    pub r_2hxynz: f64,
    /// Longitudinal 1H relaxation.
    pub r_hz: f64,
    /// Two-spin order relaxation (2HzNz).
    pub r_2hznz: f64,
    /// Cross-correlation between Hxy and 2HxyNz.
    pub etaxy: f64,
    /// Cross-correlation between Hz and 2HzNz.
    pub etaz: f64,
}

/// Free-precession Liouvillian with two-site exchange (`A → B` at `kab`, `B → A` at `kba`).
pub fn free_liouvillian(a: &SiteTerms, b: &SiteTerms, kab: f64, kba: f64) -> Liouvillian {
    use Component::*;

    let mut l = Liouvillian::zeros();

    for (state, site) in [(State::A, a), (State::B, b)] {
        let i = |c: Component| c.index(state);

        l[(i(Hx), i(Hx))] = -site.r_hxy;
        l[(i(Hy), i(Hy))] = -site.r_hxy;
        l[(i(Hz), i(Hz))] = -site.r_hz;
        l[(i(HxNz), i(HxNz))] = -site.r_2hxynz;
        l[(i(HyNz), i(HyNz))] = -site.r_2hxynz;
        l[(i(HzNz), i(HzNz))] = -site.r_2hznz;

        for (p, q) in [(Hx, HxNz), (Hy, HyNz)] {
            l[(i(p), i(q))] = -site.etaxy;
            l[(i(q), i(p))] = -site.etaxy;
        }
        l[(i(Hz), i(HzNz))] = -site.etaz;
        l[(i(HzNz), i(Hz))] = -site.etaz;

        // Chemical shift: rotation about z.
        for (x, y) in [(Hx, Hy), (HxNz, HyNz)] {
            l[(i(x), i(y))] = -site.offset;
            l[(i(y), i(x))] = site.offset;
        }

        // Scalar coupling: Hx ↔ 2HyNz and Hy ↔ 2HxNz.
        l[(i(Hx), i(HyNz))] = -site.pi_j;
        l[(i(HyNz), i(Hx))] = site.pi_j;
        l[(i(Hy), i(HxNz))] = site.pi_j;
        l[(i(HxNz), i(Hy))] = -site.pi_j;
    }

    for k in 0..STATE_DIM {
        let ia = State::A.base() + k;
        let ib = State::B.base() + k;
        l[(ia, ia)] -= kab;
        l[(ib, ib)] -= kba;
        l[(ia, ib)] += kba;
        l[(ib, ia)] += kab;
    }

    l
}

/// 1H rf field along +x with amplitude `omega1` (rad/s), applied to both states.
pub fn rf_x(omega1: f64) -> Liouvillian {
    use Component::*;

    let mut l = Liouvillian::zeros();
    for state in State::BOTH {
        let i = |c: Component| c.index(state);
        for (y, z) in [(Hy, Hz), (HyNz, HzNz)] {
            l[(i(y), i(z))] = -omega1;
            l[(i(z), i(y))] = omega1;
        }
    }
    l
}

/// Propagator of an instantaneous 180° 1H pulse about x.
pub fn ideal_180_x() -> Liouvillian {
    use Component::*;

    let mut p = Liouvillian::zeros();
    for state in State::BOTH {
        for (c, sign) in [(Hx, 1.0), (Hy, -1.0), (Hz, -1.0), (HxNz, 1.0), (HyNz, -1.0), (HzNz, -1.0)] {
            let k = c.index(state);
            p[(k, k)] = sign;
        }
    }
    p
}

/// Phase-cycled z-filter: keeps 2HxNz of each state and stores it as 2HzNz.
pub fn store_anti_phase_along_z() -> Liouvillian {
    let mut p = Liouvillian::zeros();
    for state in State::BOTH {
        p[(Component::HzNz.index(state), Component::HxNz.index(state))] = 1.0;
    }
    p
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site(offset: f64, pi_j: f64) -> SiteTerms {
        SiteTerms {
            offset,
            pi_j,
            r_hxy: 10.0,
            r_2hxynz: 11.5,
            r_hz: 1.0,
            r_2hznz: 2.5,
            etaxy: 0.3,
            etaz: 0.1,
        }
    }

    #[test]
    fn exchange_conserves_total_population() {
        let l = free_liouvillian(&site(0.0, 0.0), &site(0.0, 0.0), 25.0, 475.0);
        // Column sums of the pure exchange block vanish once relaxation is removed.
        let mut no_relax = site(0.0, 0.0);
        no_relax.r_hxy = 0.0;
        no_relax.r_2hxynz = 0.0;
        no_relax.r_hz = 0.0;
        no_relax.r_2hznz = 0.0;
        no_relax.etaxy = 0.0;
        no_relax.etaz = 0.0;
        let k = free_liouvillian(&no_relax, &no_relax, 25.0, 475.0);
        for col in 0..DIM {
            let sum: f64 = k.column(col).iter().sum();
            assert!(sum.abs() < 1e-12, "column {col} sums to {sum}");
        }
        assert!(l[(0, 0)] < k[(0, 0)]);
    }

    #[test]
    fn coherent_terms_are_antisymmetric() {
        let mut s = site(1500.0, -292.0);
        s.r_hxy = 0.0;
        s.r_2hxynz = 0.0;
        s.r_hz = 0.0;
        s.r_2hznz = 0.0;
        s.etaxy = 0.0;
        s.etaz = 0.0;
        let l = free_liouvillian(&s, &s, 0.0, 0.0) + rf_x(2.0e4);
        let sym = l + l.transpose();
        assert!(sym.norm() < 1e-9);
    }

    #[test]
    fn ideal_pulse_is_an_involution() {
        let p = ideal_180_x();
        assert!((p * p - Liouvillian::identity()).norm() < 1e-15);
    }

    #[test]
    fn z_filter_moves_anti_phase_to_two_spin_order() {
        let mut m = Magnetization::zeros();
        m[Component::HxNz.index(State::A)] = 0.7;
        m[Component::HyNz.index(State::A)] = 0.4;
        m[Component::HxNz.index(State::B)] = 0.2;
        let out = store_anti_phase_along_z() * m;
        assert_eq!(out[Component::HzNz.index(State::A)], 0.7);
        assert_eq!(out[Component::HzNz.index(State::B)], 0.2);
        assert_eq!(out[Component::HyNz.index(State::A)], 0.0);
    }
}
