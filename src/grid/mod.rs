mod extend;

pub use extend::{cells_crossing, extend_grid};
