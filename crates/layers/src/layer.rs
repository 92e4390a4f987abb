#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct LayerId(pub u64);

/// A map overlay with a stable id and a display name for logs and legends.
pub trait Layer {
    fn id(&self) -> LayerId;

    fn name(&self) -> &'static str;
}
