//! Collaborator interfaces for datasets and trained weights.
//!
//! The core consumes and produces only two narrow contracts. File formats,
//! decompression and persistence all live behind them, outside this crate:
//!
//! - [`DatasetProvider`] hands the trainer an images matrix and a label
//!   vector. Normalizing pixel values into a consistent range is the
//!   provider's responsibility.
//! - [`WeightsConsumer`] receives the trained weight matrices; what it does
//!   with them (serialization, transfer, plotting) is its own concern.
//!
//! All I/O behind these traits is assumed complete before training begins;
//! nothing in the core blocks or retries.

use crate::matrix::Matrix;

/// Source of training data: `m` examples, one per row.
pub trait DatasetProvider {
    /// The images matrix, `m×n` with one flattened example per row.
    fn images(&self) -> &Matrix;

    /// The label vector, `m×1` with integer class indices in `[0, k-1]`.
    fn labels(&self) -> &Matrix;
}

/// Sink for trained parameters.
pub trait WeightsConsumer {
    /// Accepts the trained weight matrices `t1` (`h×(n+1)`) and `t2`
    /// (`k×(h+1)`).
    fn accept(&mut self, t1: &Matrix, t2: &Matrix);
}

/// A dataset provider over matrices that already live in memory.
pub struct InMemoryDataset {
    images: Matrix,
    labels: Matrix,
}

impl InMemoryDataset {
    /// Wraps pre-materialized images (`m×n`) and labels (`m×1`).
    ///
    /// # Panics
    /// Panics if the label vector is not a column or disagrees with the
    /// images in example count.
    pub fn new(images: Matrix, labels: Matrix) -> Self {
        assert!(
            labels.is_column() && labels.rows() == images.rows(),
            "labels must be {}x1, got {}x{}",
            images.rows(),
            labels.rows(),
            labels.columns()
        );
        Self { images, labels }
    }

    /// Number of examples.
    pub fn len(&self) -> usize {
        self.images.rows()
    }

    /// Always `false`: matrices have at least one row by construction.
    pub fn is_empty(&self) -> bool {
        false
    }
}

impl DatasetProvider for InMemoryDataset {
    fn images(&self) -> &Matrix {
        &self.images
    }

    fn labels(&self) -> &Matrix {
        &self.labels
    }
}

/// A weights consumer that simply clones the matrices into memory, useful for
/// tests and for callers that persist weights elsewhere.
#[derive(Default)]
pub struct CapturedWeights {
    /// The last weight pair handed over, if any.
    pub weights: Option<(Matrix, Matrix)>,
}

impl WeightsConsumer for CapturedWeights {
    fn accept(&mut self, t1: &Matrix, t2: &Matrix) {
        self.weights = Some((t1.clone(), t2.clone()));
    }
}
