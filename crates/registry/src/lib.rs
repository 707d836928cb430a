pub mod bridge;
pub mod error;
pub mod traits;

pub use bridge::{BridgeStage, RegistryBridge, SubmitOutcome};
pub use error::RegistryError;
pub use traits::{DynRegistrar, Registrar};
