//! CLI library components for `fablims`.

pub mod logging;
pub mod normalize;
