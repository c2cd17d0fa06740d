mod imports;
mod stops;
mod workspaces;

pub use imports::*;
pub use stops::*;
pub use workspaces::*;
