use std::collections::BTreeSet;

use vfs_types::Capability;

/// What a backend declares at `open` time (spec §4.1, §6): which optional
/// operations it supports, and the object-size bounds it enforces.
#[derive(Debug, Clone)]
pub struct Capabilities {
    pub set: BTreeSet<Capability>,
    pub min_object_size: u64,
    pub max_object_size: u64,
}

impl Capabilities {
    pub fn new(caps: impl IntoIterator<Item = Capability>, min_object_size: u64, max_object_size: u64) -> Self {
        Self {
            set: caps.into_iter().collect(),
            min_object_size,
            max_object_size,
        }
    }

    pub fn has(&self, cap: Capability) -> bool {
        self.set.contains(&cap)
    }
}
