pub mod journal;
pub mod refresh;

pub use refresh::{RefreshSequencer, RefreshToken};
