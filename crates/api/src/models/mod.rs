pub mod fragment;
pub mod record;
pub mod util;
pub mod view;

pub use fragment::*;
pub use record::*;
pub use view::*;
