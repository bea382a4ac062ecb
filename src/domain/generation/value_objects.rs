//! Generation Context - Value Objects

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

/// 合图数量下限
pub const BLEND_MIN_IMAGES: usize = 2;

/// 合图数量上限
pub const BLEND_MAX_IMAGES: usize = 5;

/// 编码后的图片（data URL）
///
/// 不变量: 内容总是 `data:image/png;base64,` 开头
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EncodedImage(String);

impl EncodedImage {
    const PREFIX: &'static str = "data:image/png;base64,";

    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self(format!("{}{}", Self::PREFIX, STANDARD.encode(bytes)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// U/V 操作类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChangeAction {
    /// 放大（U）
    Upscale,
    /// 变换（V）
    Variation,
}

impl ChangeAction {
    pub fn from_letter(letter: char) -> Option<Self> {
        match letter {
            'U' => Some(Self::Upscale),
            'V' => Some(Self::Variation),
            _ => None,
        }
    }

    pub fn letter(&self) -> char {
        match self {
            Self::Upscale => 'U',
            Self::Variation => 'V',
        }
    }
}

/// 变换请求：对已有任务的某一宫格执行 U/V
///
/// 不变量: index 在 1..=4 之间，task_id 为纯数字
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeRequest {
    pub task_id: String,
    pub action: ChangeAction,
    pub index: u8,
}

impl ChangeRequest {
    /// 服务端 simple-change 接口使用的 content 文本
    pub fn content(&self) -> String {
        format!("{} {}{}", self.task_id, self.action.letter(), self.index)
    }
}

impl std::fmt::Display for ChangeRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.content())
    }
}

/// 合图比例
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BlendDimensions {
    /// 2:3
    Portrait,
    /// 1:1
    #[default]
    Square,
    /// 3:2
    Landscape,
}

/// 默认出图参数
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultParams {
    #[serde(default = "default_action")]
    pub action: String,

    #[serde(default)]
    pub prompt: String,
}

fn default_action() -> String {
    "IMAGINE:出图".to_string()
}

impl Default for DefaultParams {
    fn default() -> Self {
        Self {
            action: default_action(),
            prompt: String::new(),
        }
    }
}

impl DefaultParams {
    /// 在默认关键词后拼接用户关键词
    pub fn compose_prompt(&self, prompt: &str) -> String {
        let prompt = prompt.trim();
        if self.prompt.is_empty() {
            prompt.to_string()
        } else if prompt.is_empty() {
            self.prompt.clone()
        } else {
            format!("{}, {}", self.prompt, prompt)
        }
    }
}
