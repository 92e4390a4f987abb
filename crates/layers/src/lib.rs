pub mod detail;
pub mod land_cover;
pub mod layer;
pub mod markers;
pub mod reliability;
pub mod session;
pub mod symbology;

pub use layer::*;
pub use reliability::*;
