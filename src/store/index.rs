use serde::{Deserialize, Serialize};

use super::StoreError;

/// A single similarity-search result.
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    /// Insertion-order handle of the matching chunk.
    pub handle: usize,
    /// Stored source text of the matching chunk.
    pub text: String,
    /// Inner product of the normalized vectors, in `[-1, 1]`.
    pub score: f32,
}

/// Flat inner-product vector index over one document's chunks.
///
/// Vectors are L2-normalized on insertion so that inner-product search
/// emulates cosine similarity. Insertion order doubles as the handle that
/// maps a hit back to its source text.
#[derive(Debug, Serialize, Deserialize)]
pub struct VectorIndex {
    dimension: usize,
    vectors: Vec<Vec<f32>>,
    texts: Vec<String>,
}

impl VectorIndex {
    /// Create an empty index with a fixed vector dimension.
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            vectors: Vec::new(),
            texts: Vec::new(),
        }
    }

    /// Dimension every stored and queried vector must have.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Number of entries stored in the index.
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    /// Whether the index holds no entries.
    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// Append `(vector, text)` pairs, normalizing each vector before storage.
    ///
    /// Rows with zero norm are stored as-is (the divisor is clamped to 1),
    /// so they can never match a query but never poison the index either.
    pub fn add(&mut self, vectors: Vec<Vec<f32>>, texts: Vec<String>) -> Result<(), StoreError> {
        if vectors.len() != texts.len() {
            return Err(StoreError::LengthMismatch {
                vectors: vectors.len(),
                texts: texts.len(),
            });
        }

        for vector in &vectors {
            if vector.len() != self.dimension {
                return Err(StoreError::DimensionMismatch {
                    expected: self.dimension,
                    actual: vector.len(),
                });
            }
        }

        self.vectors
            .extend(vectors.into_iter().map(|vector| normalize(&vector)));
        self.texts.extend(texts);

        debug_assert_eq!(self.vectors.len(), self.texts.len());
        Ok(())
    }

    /// Inner-product search over all stored vectors, best first.
    ///
    /// The query is normalized the same way as stored rows; a zero-norm
    /// query yields an empty result rather than an error. Handles that fall
    /// outside the text table are skipped defensively.
    pub fn search(&self, query: &[f32], top_k: usize) -> Result<Vec<SearchHit>, StoreError> {
        if query.len() != self.dimension {
            return Err(StoreError::DimensionMismatch {
                expected: self.dimension,
                actual: query.len(),
            });
        }

        let norm = query.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm == 0.0 {
            return Ok(Vec::new());
        }
        let query: Vec<f32> = query.iter().map(|v| v / norm).collect();

        let mut scored: Vec<(usize, f32)> = self
            .vectors
            .iter()
            .enumerate()
            .map(|(handle, vector)| {
                let score = vector
                    .iter()
                    .zip(query.iter())
                    .map(|(a, b)| a * b)
                    .sum::<f32>();
                (handle, score)
            })
            .collect();

        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        Ok(scored
            .into_iter()
            .take(top_k)
            .filter_map(|(handle, score)| {
                self.texts.get(handle).map(|text| SearchHit {
                    handle,
                    text: text.clone(),
                    score,
                })
            })
            .collect())
    }
}

fn normalize(vector: &[f32]) -> Vec<f32> {
    let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
    let divisor = if norm == 0.0 { 1.0 } else { norm };
    vector.iter().map(|v| v / divisor).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_index() -> VectorIndex {
        let mut index = VectorIndex::new(3);
        index
            .add(
                vec![
                    vec![1.0, 0.0, 0.0],
                    vec![0.0, 2.0, 0.0],
                    vec![0.0, 0.0, 0.5],
                ],
                vec!["a".into(), "b".into(), "c".into()],
            )
            .expect("add");
        index
    }

    #[test]
    fn exact_vector_ranks_first_with_unit_score() {
        let index = sample_index();
        let hits = index.search(&[0.0, 2.0, 0.0], 1).expect("search");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].text, "b");
        assert!((hits[0].score - 1.0).abs() < 1e-5);
    }

    #[test]
    fn results_are_ordered_best_first() {
        let index = sample_index();
        let hits = index.search(&[0.9, 0.1, 0.0], 3).expect("search");
        assert_eq!(hits[0].text, "a");
        assert!(hits[0].score >= hits[1].score);
        assert!(hits[1].score >= hits[2].score);
    }

    #[test]
    fn zero_norm_query_returns_empty() {
        let index = sample_index();
        let hits = index.search(&[0.0, 0.0, 0.0], 5).expect("search");
        assert!(hits.is_empty());
    }

    #[test]
    fn zero_norm_rows_are_stored_without_error() {
        let mut index = VectorIndex::new(2);
        index
            .add(vec![vec![0.0, 0.0]], vec!["empty".into()])
            .expect("add");
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn length_mismatch_is_rejected() {
        let mut index = VectorIndex::new(2);
        let error = index
            .add(vec![vec![1.0, 0.0]], vec!["a".into(), "b".into()])
            .unwrap_err();
        assert!(matches!(
            error,
            StoreError::LengthMismatch {
                vectors: 1,
                texts: 2
            }
        ));
    }

    #[test]
    fn dimension_mismatch_is_rejected_on_add_and_search() {
        let mut index = VectorIndex::new(3);
        let add_error = index.add(vec![vec![1.0, 0.0]], vec!["a".into()]).unwrap_err();
        assert!(matches!(add_error, StoreError::DimensionMismatch { .. }));

        let search_error = index.search(&[1.0], 1).unwrap_err();
        assert!(matches!(search_error, StoreError::DimensionMismatch { .. }));
    }

    #[test]
    fn top_k_bounds_the_result_count() {
        let index = sample_index();
        let hits = index.search(&[1.0, 1.0, 1.0], 2).expect("search");
        assert_eq!(hits.len(), 2);
    }
}
