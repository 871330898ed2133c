pub mod projector;
pub mod window;

pub use projector::*;
pub use window::*;
