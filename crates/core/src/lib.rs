pub mod catalog;
pub mod error;
pub mod logging;

pub mod index;
pub mod loader;
pub mod site;

pub use catalog::ModuleCatalog;
pub use error::Result;
pub use index::{ImplementorIndex, IndexRegistrar};
pub use loader::{FragmentLoader, LoadOutcome, LoadReport};
pub use site::{SiteIndex, SubmitHandle};
