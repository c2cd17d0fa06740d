mod error;
mod session;
mod stop;

pub use error::*;
pub use session::*;
pub use stop::*;
