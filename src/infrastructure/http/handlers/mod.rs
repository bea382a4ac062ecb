//! HTTP Handlers

mod events;
mod help;
mod ping;

pub use events::*;
pub use help::*;
pub use ping::*;
