//! Points of interest: marker styling, filtering and creation.

mod create;
mod filter;
mod style;

pub use create::{create_poi, next_id};
pub use filter::PoiFilter;
pub use style::{CategoryStyle, CategoryStyleTable};
