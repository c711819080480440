pub mod ports;
pub mod tracker;
pub mod types;

pub use ports::*;
pub use tracker::*;
pub use types::*;
