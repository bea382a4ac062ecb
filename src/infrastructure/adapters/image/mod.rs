//! Image Adapter - 图片下载、压缩与编码

mod jpeg_image_processor;

pub use jpeg_image_processor::{JpegImageProcessor, JpegImageProcessorConfig};
