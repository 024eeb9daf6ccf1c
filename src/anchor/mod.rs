pub mod record;
pub mod store;

pub use record::*;
pub use store::*;
