//! Safe SQL builder: identifiers from `Record` constants only, values as parameters.

mod builder;
pub mod params;
pub mod violation;
pub use builder::*;
pub use params::*;
pub use violation::{ConstraintViolation, ViolationKind};
