//! Command Handlers 实现

mod image_arrival_handler;
mod imagine_handler;
mod message_dispatcher;

pub use image_arrival_handler::ImageArrivalHandler;
pub use imagine_handler::{ImagineCommandHandler, ImagineSettings};
pub use message_dispatcher::MessageDispatcher;
