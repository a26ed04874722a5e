use std::collections::{btree_map, BTreeMap};

use crate::SplitDirection;

/// The two nets an original inout net is replaced by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitNet {
    pub input: usize,
    pub output: usize,
}

impl SplitNet {
    pub fn get(&self, direction: SplitDirection) -> usize {
        match direction {
            SplitDirection::Input => self.input,
            SplitDirection::Output => self.output,
        }
    }
}

/// Translation from original inout nets to their split replacements. Immutable once built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NetMap(BTreeMap<usize, SplitNet>);

impl NetMap {
    pub fn new() -> NetMap {
        NetMap(BTreeMap::new())
    }

    pub fn get(&self, net: usize) -> Option<SplitNet> {
        self.0.get(&net).copied()
    }

    pub fn net(&self, net: usize, direction: SplitDirection) -> Option<usize> {
        self.get(net).map(|split| split.get(direction))
    }

    pub fn contains(&self, net: usize) -> bool {
        self.0.contains_key(&net)
    }

    pub fn iter(&self) -> btree_map::Iter<usize, SplitNet> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(usize, SplitNet)> for NetMap {
    fn from_iter<T: IntoIterator<Item = (usize, SplitNet)>>(iter: T) -> Self {
        NetMap(iter.into_iter().collect())
    }
}
