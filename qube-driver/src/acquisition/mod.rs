mod coefficient;
mod compiler;
mod mode;
mod window;

pub use coefficient::*;
pub use compiler::*;
pub use mode::*;
pub use window::*;
