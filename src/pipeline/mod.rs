//! Pipeline module - load, profile, transform, split, model and evaluate

pub mod error;
pub mod evaluate;
pub mod forest;
pub mod frame;
pub mod glm;
pub mod loader;
pub mod profile;
pub mod record;
pub mod runner;
pub mod split;
pub mod transform;

pub use error::*;
pub use evaluate::*;
pub use forest::*;
pub use glm::*;
pub use loader::*;
pub use profile::*;
pub use record::*;
pub use runner::*;
pub use split::*;
pub use transform::*;
