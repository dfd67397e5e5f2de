//! Domain value types with fixed archive representations.

mod datetime;
mod key;
mod tenor;

pub use datetime::DateTime;
pub use key::Key;
pub use tenor::{Tenor, TenorUnit};
