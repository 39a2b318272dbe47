pub mod config;
pub mod constants;
pub mod engine;
pub mod error;
pub mod mode;
pub mod population;
pub mod state;

pub use config::{ConfigError, SimConfig};
pub use engine::{MolesPolicy, StateEngine};
pub use error::GasError;
pub use mode::{ConstraintMode, Quantity};
pub use state::GasState;
