mod reducer;
mod sync_error;
mod synchronizer;

pub use reducer::*;
pub use sync_error::*;
pub use synchronizer::*;
