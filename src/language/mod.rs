pub mod core;

pub use core::{Language, DEFAULT_LANGUAGE};
