//! Library side of the `linkage` binary: logging setup and file loading.

pub mod input;
pub mod logging;
