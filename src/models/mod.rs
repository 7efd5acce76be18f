pub mod limit_up;
pub mod summary;

pub use limit_up::*;
pub use summary::*;
