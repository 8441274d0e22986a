//! Normalization of the loosely typed records exported from the realtime store.
//!
//! Everything here is tolerant: malformed records are skipped and malformed numbers become zero,
//! so that the core only ever sees well-formed values.

pub mod device;
pub mod history;
pub mod reading;
pub mod switch;
