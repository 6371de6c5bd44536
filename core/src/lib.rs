pub use chip8::Chip8;
pub use error::CoreError;
pub use framebuffer::{Pixels, Rect};
pub use scheduler::{Config, Scheduler};
pub use state::Mode;

pub mod constants;

mod chip8;
mod dispatch;
mod error;
mod framebuffer;
mod memory;
mod opcode;
mod operations;
mod scheduler;
mod state;
