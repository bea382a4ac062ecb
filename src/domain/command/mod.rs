//! Command Context - 聊天指令限界上下文
//!
//! 职责:
//! - 拆分关键词与 `--` 参数
//! - 识别垫图 / 合图 / 变换子指令
//! - 生成用法提示

mod errors;
mod parser;

pub use errors::CommandError;
pub use parser::{
    parse_change_request, split_prompt, CommandMarkers, ImagineCommand, PromptParts,
};
