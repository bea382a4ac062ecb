//! 应用服务
//!
//! 轮询、结果转发以及两者组合成的出图流程

mod generation_flow;
mod poller;
mod relay;

pub use generation_flow::{GenerationFlow, Submission};
pub use poller::{PollConfig, TaskPoller};
pub use relay::{
    render_completion, rewrite_image_url, submission_notice, CompletionVars, RelayConfig,
    ResultRelay,
};
