//! Small, dependency-light helpers shared by the fur crates.

pub mod error;
pub mod fs;
pub mod path;
pub mod slug;
