pub mod base;
pub mod logging;
pub mod reader;

pub use base::*;
pub use logging::*;
pub use reader::*;
