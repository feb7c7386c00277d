mod fs;
pub(crate) mod io;

pub use fs::{expand_user, require_file_exists};
pub(crate) use fs::extension;
pub use io::INDEX_COLUMN;
