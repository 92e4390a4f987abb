pub mod clock;
pub mod debounce;
pub mod event_bus;

pub use clock::*;
pub use debounce::*;
pub use event_bus::*;
