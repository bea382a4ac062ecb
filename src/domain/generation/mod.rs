//! Generation Context - 绘图任务限界上下文
//!
//! 职责:
//! - 远端任务快照与终态判定
//! - 耗时统计
//! - U/V 变换、合图比例、图片编码等值对象

mod entities;
mod value_objects;

pub use entities::{ElapsedMetrics, GenerationTask, TaskStatus};
pub use value_objects::{
    BlendDimensions, ChangeAction, ChangeRequest, DefaultParams, EncodedImage, BLEND_MAX_IMAGES,
    BLEND_MIN_IMAGES,
};
