pub mod global;
pub mod mapping;
pub mod physical;
pub mod relation;

pub use global::*;
pub use mapping::*;
pub use physical::*;
pub use relation::*;
