//! Infrastructure Adapters
//!
//! 六边形架构的适配器实现

pub mod channel;
pub mod image;
pub mod midjourney;
pub mod openai;
pub mod shortener;

pub use channel::*;
pub use image::*;
pub use midjourney::*;
pub use openai::*;
pub use shortener::*;
