//! Linear-algebra building blocks for the back-calculation.
//!
//! - the two-site product-operator basis and Liouvillian assembly (`liouvillian`)
//! - matrix exponentials and repeated propagation (`propagator`)

pub mod liouvillian;
pub mod propagator;

pub use liouvillian::*;
pub use propagator::*;
