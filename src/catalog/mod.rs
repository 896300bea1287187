mod load;
mod types;

pub use load::load_catalog;
pub use types::{Catalog, Collection, Source, parse_tags};
