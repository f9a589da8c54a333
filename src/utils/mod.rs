// src/utils/mod.rs

pub mod error;
pub mod logger;

pub use error::{CmsError, CmsResult, ErrorKind};
pub use logger::*;
