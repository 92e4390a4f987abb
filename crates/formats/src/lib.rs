pub mod assets;
pub mod geocode;
pub mod point_collection;
pub mod prediction;

pub use assets::*;
pub use geocode::*;
pub use point_collection::*;
pub use prediction::*;
