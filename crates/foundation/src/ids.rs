/// Stable identity of a prediction point: its index in the source collection.
///
/// Dropped features keep their slot, so ids of surviving points are not
/// necessarily contiguous.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PointId(pub u32);

impl PointId {
    pub fn new(index: u32) -> Self {
        PointId(index)
    }

    pub fn index(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for PointId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}
