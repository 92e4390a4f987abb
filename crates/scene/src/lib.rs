pub mod index;
pub mod selection;
pub mod viewport;

pub use index::*;
pub use selection::*;
pub use viewport::*;
