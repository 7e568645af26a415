pub mod state;
pub mod types;

pub use state::{ApplicationState, StateField};
pub use types::*;
