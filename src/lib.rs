//! Tiered electricity billing over cumulative meter readings.
//!
//! [`core`] holds the pure computations: the progressive tariff and the billing-cycle window
//! arithmetic. [`records`] turns loosely typed exports of the realtime store into the values
//! the core consumes.

pub mod config;
pub mod core;
pub mod prelude;
pub mod quantity;
pub mod records;
