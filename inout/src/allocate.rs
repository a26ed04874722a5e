use std::collections::BTreeSet;

use crate::Error;

// Yosys numbers nets from 2; 0 and 1 are avoided "to avoid confusion" with constants.
const FIRST_NET: usize = 2;

/// Returns the id directly after the first gap in `occupied`, or one past the largest id if there is no gap.
///
/// Ids below the smallest occupied one are never returned.
pub fn free_net(occupied: &BTreeSet<usize>) -> usize {
    for (&current, &next) in occupied.iter().zip(occupied.iter().skip(1)) {
        if next - current > 1 {
            return current + 1;
        }
    }
    match occupied.last() {
        Some(&last) => last + 1,
        None => FIRST_NET,
    }
}

/// Dense allocator over the net id space of one module.
#[derive(Debug, Clone)]
pub struct NetAllocator {
    occupied: BTreeSet<usize>,
}

impl NetAllocator {
    pub fn new(occupied: impl IntoIterator<Item = usize>) -> NetAllocator {
        NetAllocator { occupied: occupied.into_iter().collect() }
    }

    /// Allocates one id. Each id is occupied before the next one is chosen.
    pub fn allocate(&mut self) -> Result<usize, Error> {
        let net = free_net(&self.occupied);
        if !self.occupied.insert(net) {
            return Err(Error::NetCollision(net));
        }
        Ok(net)
    }
}

#[cfg(test)]
mod test {
    use std::collections::BTreeSet;

    use super::{free_net, NetAllocator};

    #[test]
    fn test_free_net_gap() {
        assert_eq!(free_net(&BTreeSet::from([0, 1, 3])), 2);
    }

    #[test]
    fn test_free_net_dense() {
        assert_eq!(free_net(&BTreeSet::from([0, 1, 2])), 3);
    }

    #[test]
    fn test_free_net_single() {
        assert_eq!(free_net(&BTreeSet::from([5])), 6);
    }

    #[test]
    fn test_free_net_empty() {
        assert_eq!(free_net(&BTreeSet::new()), 2);
    }

    #[test]
    fn test_allocate_fills_gaps_then_extends() {
        let mut allocator = NetAllocator::new([2, 3, 6, 7]);
        let nets = (0..4).map(|_| allocator.allocate().unwrap()).collect::<Vec<_>>();
        assert_eq!(nets, vec![4, 5, 8, 9]);
    }

    #[test]
    fn test_allocate_disjoint() {
        let initial = BTreeSet::from([2, 4, 9, 10, 30]);
        let mut allocator = NetAllocator::new(initial.iter().copied());
        let mut allocated = BTreeSet::new();
        for _ in 0..50 {
            let net = allocator.allocate().unwrap();
            assert!(!initial.contains(&net));
            assert!(allocated.insert(net));
        }
    }
}
