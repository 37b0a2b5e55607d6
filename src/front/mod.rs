mod cli;
mod ops;

pub use cli::*;
pub use ops::{apply, check, render_endpoints, render_networks, run};
