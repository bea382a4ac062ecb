//! 绘图指令解析
//!
//! 输入为去掉触发前缀后的消息正文，例如:
//! - `a cute cat --ar 16:9`      普通出图
//! - `/p a cute cat`             垫图（随后发送一张图片）
//! - `/b 3`                      合图（随后发送 3 张图片）
//! - `/c 8528881058085979 V1`    对已有任务执行 U/V

use once_cell::sync::Lazy;
use regex::Regex;

use super::errors::CommandError;
use crate::domain::generation::{ChangeAction, ChangeRequest, BLEND_MAX_IMAGES, BLEND_MIN_IMAGES};

static CHANGE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+)\s([UV])([1-4])$").expect("valid change pattern"));

/// 关键词与参数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptParts {
    /// `--` 之前的关键词
    pub prompt: String,
    /// `--` 及之后的参数，形如 ` --ar 16:9`，没有参数时为空
    pub options: String,
}

/// 拆分关键词与参数，中文输入法的破折号会被规范化为 `--`
pub fn split_prompt(content: &str) -> PromptParts {
    let normalized = content.replace("——", "--").replace('—', "--");
    match normalized.split_once("--") {
        Some((prompt, options)) => PromptParts {
            prompt: prompt.trim().to_string(),
            options: format!(" --{}", options.trim()),
        },
        None => PromptParts {
            prompt: normalized.trim().to_string(),
            options: String::new(),
        },
    }
}

/// 解析 U/V 指令，格式 `<taskId> <U|V><1-4>`
pub fn parse_change_request(text: &str) -> Option<ChangeRequest> {
    let captures = CHANGE_PATTERN.captures(text)?;
    let action = captures[2].chars().next().and_then(ChangeAction::from_letter)?;
    let index = captures[3].parse().ok()?;
    Some(ChangeRequest {
        task_id: captures[1].to_string(),
        action,
        index,
    })
}

/// 解析后的绘图指令
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImagineCommand {
    /// 垫图：等待用户发送一张参考图
    SeedImage { prompt: String },
    /// 合图：等待用户发送 count 张图片
    Blend { count: usize, prompt: String },
    /// U/V 变换
    Change(ChangeRequest),
    /// 普通出图
    Generate { prompt: String, options: String },
}

/// 子指令标记
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandMarkers {
    pub image_ins: String,
    pub blend_ins: String,
    pub change_ins: String,
    /// 宿主的画图触发前缀，仅用于拼接用法提示
    pub trigger: String,
}

impl Default for CommandMarkers {
    fn default() -> Self {
        Self {
            image_ins: "/p".to_string(),
            blend_ins: "/b".to_string(),
            change_ins: "/c".to_string(),
            trigger: "画".to_string(),
        }
    }
}

impl CommandMarkers {
    /// 按 垫图 → 合图 → 变换 的顺序匹配子指令，都不匹配时为普通出图
    pub fn parse(&self, content: &str) -> Result<ImagineCommand, CommandError> {
        let PromptParts { prompt, options } = split_prompt(content);

        if prompt.contains(&self.image_ins) {
            let prompt = prompt.replace(&self.image_ins, "");
            return Ok(ImagineCommand::SeedImage {
                prompt: format!("{}{}", prompt.trim(), options),
            });
        }

        if let Some((before, after)) = prompt.split_once(&self.blend_ins) {
            return self.parse_blend(before, after);
        }

        if prompt.contains(&self.change_ins) {
            let text = prompt
                .replace(&self.change_ins, "")
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ");
            return parse_change_request(&text)
                .map(ImagineCommand::Change)
                .ok_or_else(|| self.change_usage());
        }

        Ok(ImagineCommand::Generate { prompt, options })
    }

    fn parse_blend(&self, before: &str, after: &str) -> Result<ImagineCommand, CommandError> {
        let mut tokens = after.split_whitespace();
        let count = tokens
            .next()
            .and_then(|t| t.parse::<usize>().ok())
            .filter(|n| (BLEND_MIN_IMAGES..=BLEND_MAX_IMAGES).contains(n))
            .ok_or_else(|| self.blend_usage())?;

        let prompt = before
            .split_whitespace()
            .chain(tokens)
            .collect::<Vec<_>>()
            .join(" ");

        Ok(ImagineCommand::Blend { count, prompt })
    }

    fn blend_usage(&self) -> CommandError {
        CommandError::InvalidBlendCount {
            trigger: self.trigger.clone(),
            marker: self.blend_ins.clone(),
        }
    }

    fn change_usage(&self) -> CommandError {
        CommandError::InvalidChangeFormat {
            trigger: self.trigger.clone(),
            marker: self.change_ins.clone(),
        }
    }
}
