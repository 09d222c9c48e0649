//! Client-side caching of remotely loaded collections.

pub mod range;

pub use range::{FULLY_CACHED, RangeCache, RangeError};
