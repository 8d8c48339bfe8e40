mod capture;
mod wave;

pub use capture::*;
pub use wave::*;
