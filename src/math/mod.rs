pub mod tick_math;
pub mod token_math;

pub use tick_math::*;
pub use token_math::*;
