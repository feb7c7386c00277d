mod cells;
mod io;

pub use cells::{Cells, ColumnValues};
