//! OpenAI Adapter - 关键词扩写

mod openai_prompt_optimizer;

pub use openai_prompt_optimizer::{OpenAiPromptOptimizer, OpenAiPromptOptimizerConfig};
