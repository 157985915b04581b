//! perceptra: a small dense-matrix engine and image classifier in Rust.
//!
//! Trains a fully-connected neural network with one sigmoid hidden layer to
//! classify fixed-size grayscale images, using full-batch gradient descent
//! with L2 regularization.
//!
//! # Features
//!
//! - Dense 2-D `f64` matrix type with arithmetic, shape operations,
//!   reductions and randomized fill.
//! - Forward propagation, analytically derived backpropagation, regularized
//!   cross-entropy cost and prediction by per-row argmax.
//! - Narrow collaborator traits for dataset loading and weight persistence,
//!   keeping all file formats outside the core.
//!
//! # Goals
//!
//! - Correct vectorized calculus with fail-fast shape validation.
//! - Deterministic, reproducible training given an injected RNG seed.
//! - Explicit numerics: known hazards (sigmoid saturation feeding `ln`,
//!   normalizing a constant matrix) propagate rather than being patched over.
//!
//! # Modules
//!
//! - [`matrix`] — Dense 2-D matrix engine.
//! - [`network`] — Two-layer network training and prediction.
//! - [`dataset`] — Collaborator interfaces for datasets and trained weights.
//! - [`approx`] — Utilities to approximate equality of floating point values.
//!
//! # Example
//!
//! ```rust
//! use perceptra::matrix;
//! use perceptra::network::{NetworkConfig, TwoLayerNetwork};
//! use rand::{SeedableRng, rngs::StdRng};
//!
//! let images = matrix!([[0.0, 1.0], [1.0, 0.0], [0.1, 0.9], [0.9, 0.1]]);
//! let labels = matrix!([[0.0], [1.0], [0.0], [1.0]]);
//!
//! let mut rng = StdRng::seed_from_u64(7);
//! let config = NetworkConfig::new(2, 2, 4);
//! let mut nn = TwoLayerNetwork::new(config, images.clone(), labels, &mut rng);
//! let history = nn.train(10);
//! assert_eq!(history.len(), 11);
//! let predictions = nn.predict(&images);
//! assert_eq!(predictions.shape(), (4, 1));
//! ```

pub mod approx;
pub mod dataset;
pub mod matrix;
pub mod network;

pub use dataset::{DatasetProvider, InMemoryDataset, WeightsConsumer};
pub use matrix::Matrix;
pub use network::{NetworkConfig, TwoLayerNetwork, WeightInit};
