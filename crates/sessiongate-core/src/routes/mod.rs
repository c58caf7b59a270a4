//! Route classification and navigation admission.
//!
//! Every route is protected unless it appears in the public set of the
//! [`RouteTable`]. The [`RouteGuard`] is consulted once per navigation.

pub mod guard;
pub mod table;

pub use guard::{Admission, RouteGuard};
pub use table::RouteTable;
