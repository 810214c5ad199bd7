//! Output document model and I/O.

mod cyclonedx;
mod io;

pub use cyclonedx::*;
pub use io::{load_bom, parse_bom_str, to_json};
