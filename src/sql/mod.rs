//! Safe SQL builder: identifiers from config only, values as typed parameters.

mod builder;
pub mod params;
pub use builder::*;
pub use params::*;
