mod health_check;
mod pass_through;

pub use health_check::*;
pub use pass_through::*;
