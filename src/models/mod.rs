pub mod image;
pub mod usage;

pub use image::*;
pub use usage::*;
