use crate::domain::error::DomainError;
use std::cmp::Ordering;
use std::collections::HashSet;

/// Name of the metric the index ranks by, recorded next to the persisted artifacts.
pub const METRIC: &str = "squared_l2";

/// A nearest-neighbour hit: vector id and its squared Euclidean distance to the query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub id: u64,
    pub distance: f32,
}

/// Exact (flat) nearest-neighbour index over fixed-dimension vectors.
///
/// Vectors are stored row-major in one contiguous buffer. Search scans every
/// vector, which is the right trade-off for a knowledge base of a few
/// thousand rows at most.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorIndex {
    dimension: usize,
    ids: Vec<u64>,
    data: Vec<f32>,
}

impl VectorIndex {
    pub fn new(dimension: usize) -> Result<Self, DomainError> {
        if dimension == 0 {
            return Err(DomainError::InvalidInput(
                "vector index dimension must be greater than zero".into(),
            ));
        }
        Ok(Self {
            dimension,
            ids: Vec::new(),
            data: Vec::new(),
        })
    }

    /// Build an index from `(id, vector)` pairs. Every vector must have `dimension` components.
    pub fn from_vectors(
        dimension: usize,
        entries: impl IntoIterator<Item = (u64, Vec<f32>)>,
    ) -> Result<Self, DomainError> {
        let mut index = Self::new(dimension)?;
        let mut seen = HashSet::new();
        for (id, vector) in entries {
            if !seen.insert(id) {
                return Err(DomainError::IndexCorrupt(format!("duplicate vector id {id}")));
            }
            index.push(id, &vector)?;
        }
        Ok(index)
    }

    fn push(&mut self, id: u64, vector: &[f32]) -> Result<(), DomainError> {
        if vector.len() != self.dimension {
            return Err(DomainError::DimensionMismatch {
                expected: self.dimension,
                actual: vector.len(),
            });
        }
        self.ids.push(id);
        self.data.extend_from_slice(vector);
        Ok(())
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn ids(&self) -> &[u64] {
        &self.ids
    }

    pub fn iter(&self) -> impl Iterator<Item = (u64, &[f32])> + '_ {
        self.ids
            .iter()
            .copied()
            .zip(self.data.chunks_exact(self.dimension))
    }

    /// The `k` nearest vectors to `query`, closest first. Equal distances are
    /// ordered by ascending id so rankings are reproducible.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>, DomainError> {
        if self.is_empty() || k == 0 {
            return Ok(vec![]);
        }
        if query.len() != self.dimension {
            return Err(DomainError::DimensionMismatch {
                expected: self.dimension,
                actual: query.len(),
            });
        }

        let mut hits: Vec<Neighbor> = self
            .iter()
            .map(|(id, v)| Neighbor {
                id,
                distance: squared_l2(query, v),
            })
            .collect();

        hits.sort_by(|a, b| match a.distance.total_cmp(&b.distance) {
            Ordering::Equal => a.id.cmp(&b.id),
            other => other,
        });
        hits.truncate(k);
        Ok(hits)
    }
}

pub fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index() -> VectorIndex {
        VectorIndex::from_vectors(
            2,
            vec![
                (0, vec![0.0, 0.0]),
                (1, vec![1.0, 0.0]),
                (2, vec![0.0, 3.0]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_search_orders_by_distance() {
        let hits = index().search(&[0.9, 0.0], 3).unwrap();
        let ids: Vec<u64> = hits.iter().map(|h| h.id).collect();
        assert_eq!(ids, vec![1, 0, 2]);
        assert!((hits[0].distance - 0.01).abs() < 1e-6);
    }

    #[test]
    fn test_k_larger_than_index_returns_all() {
        assert_eq!(index().search(&[0.0, 0.0], 10).unwrap().len(), 3);
    }

    #[test]
    fn test_ties_broken_by_id() {
        let idx = VectorIndex::from_vectors(1, vec![(5, vec![1.0]), (2, vec![-1.0])]).unwrap();
        let hits = idx.search(&[0.0], 2).unwrap();
        assert_eq!(hits[0].id, 2);
        assert_eq!(hits[1].id, 5);
    }

    #[test]
    fn test_query_dimension_mismatch() {
        let err = index().search(&[0.0, 0.0, 0.0], 1).unwrap_err();
        assert!(matches!(
            err,
            DomainError::DimensionMismatch { expected: 2, actual: 3 }
        ));
    }

    #[test]
    fn test_rejects_wrong_vector_dimension() {
        let err = VectorIndex::from_vectors(3, vec![(0, vec![1.0])]).unwrap_err();
        assert!(matches!(err, DomainError::DimensionMismatch { .. }));
    }

    #[test]
    fn test_rejects_duplicate_ids() {
        let err = VectorIndex::from_vectors(1, vec![(0, vec![1.0]), (0, vec![2.0])]).unwrap_err();
        assert!(matches!(err, DomainError::IndexCorrupt(_)));
    }

    #[test]
    fn test_large_build_keeps_every_id() {
        let idx = VectorIndex::from_vectors(1, (0..20_000u64).map(|id| (id, vec![id as f32]))).unwrap();
        assert_eq!(idx.len(), 20_000);
        assert_eq!(idx.search(&[19_999.0], 1).unwrap()[0].id, 19_999);

        let dup = (0..20_000u64).chain([7]).map(|id| (id, vec![0.0]));
        assert!(matches!(VectorIndex::from_vectors(1, dup), Err(DomainError::IndexCorrupt(_))));
    }

    #[test]
    fn test_zero_dimension_rejected() {
        assert!(VectorIndex::new(0).is_err());
    }
}
