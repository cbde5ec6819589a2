//! Region to array annotation relation.
//!
//! Built completely before anything is written, then applied in one pass so
//! the store sees every reference exactly once.

use std::collections::BTreeSet;

use contracts::{AnnotatedStore, ArrayRef, ContractError, RegionRef};
use tracing::debug;

/// Bipartite relation between regions and the arrays they annotate
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnnotationRelation {
    links: BTreeSet<(RegionRef, ArrayRef)>,
}

impl AnnotationRelation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every region annotates every array
    pub fn cross_product(regions: &[RegionRef], arrays: &[ArrayRef]) -> Self {
        let mut relation = Self::new();
        for &region in regions {
            relation.link_all(region, arrays);
        }
        relation
    }

    pub fn link(&mut self, region: RegionRef, array: ArrayRef) -> bool {
        self.links.insert((region, array))
    }

    pub fn link_all(&mut self, region: RegionRef, arrays: &[ArrayRef]) {
        for &array in arrays {
            self.link(region, array);
        }
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn contains(&self, region: RegionRef, array: ArrayRef) -> bool {
        self.links.contains(&(region, array))
    }

    /// Arrays annotated by one region, ascending
    pub fn arrays_of(&self, region: RegionRef) -> impl Iterator<Item = ArrayRef> + '_ {
        self.links
            .range((region, ArrayRef(0))..=(region, ArrayRef(usize::MAX)))
            .map(|&(_, array)| array)
    }

    /// Write every link as a region reference
    pub fn apply<S>(&self, store: &mut S) -> Result<(), ContractError>
    where
        S: AnnotatedStore + ?Sized,
    {
        for &(region, array) in &self.links {
            store.add_reference(region, array)?;
        }
        debug!(links = self.links.len(), "annotation relation applied");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cross_product() {
        let regions = [RegionRef(0), RegionRef(1)];
        let arrays = [ArrayRef(3), ArrayRef(1), ArrayRef(2)];
        let relation = AnnotationRelation::cross_product(&regions, &arrays);
        assert_eq!(relation.len(), 6);
        assert!(relation.contains(RegionRef(1), ArrayRef(3)));
        let of_first: Vec<_> = relation.arrays_of(RegionRef(0)).collect();
        assert_eq!(of_first, vec![ArrayRef(1), ArrayRef(2), ArrayRef(3)]);
    }

    #[test]
    fn test_duplicate_links_collapse() {
        let mut relation = AnnotationRelation::new();
        assert!(relation.link(RegionRef(0), ArrayRef(0)));
        assert!(!relation.link(RegionRef(0), ArrayRef(0)));
        assert_eq!(relation.len(), 1);
    }

    #[test]
    fn test_empty_sides() {
        assert!(AnnotationRelation::cross_product(&[], &[ArrayRef(0)]).is_empty());
        assert!(AnnotationRelation::cross_product(&[RegionRef(0)], &[]).is_empty());
    }
}
