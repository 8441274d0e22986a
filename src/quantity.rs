#[macro_use]
mod macros;

pub mod cost;
pub mod electric;
pub mod energy;
pub mod rate;
