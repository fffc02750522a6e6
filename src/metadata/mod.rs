pub mod model;
pub mod parse;

pub use model::{AnimationInfo, FrameDescriptor};
pub use parse::{ParsingError, parse_animation_info};
