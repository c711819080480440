pub mod client;
pub mod ports;
pub mod types;

pub use client::*;
pub use ports::*;
pub use types::*;
