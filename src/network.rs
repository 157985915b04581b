//! Two-layer network training and prediction.
//!
//! # Trainer / Predictor
//!
//! One configurable trainer for a fully-connected network with a single
//! sigmoid hidden layer and a sigmoid output layer, trained by full-batch
//! gradient descent on a regularized cross-entropy cost.
//!
//! **Key operations:**
//! - **Forward propagation:** bias-augmented matrix products through both layers.
//! - **Backpropagation:** batched gradient accumulation over all examples.
//! - **Cost:** cross-entropy plus an L2 penalty that skips the bias columns.
//! - **Gradient descent:** in-place weight update, optional linear alpha annealing.
//! - **Prediction:** per-row argmax over the network output.
//!
//! ## Lifecycle
//!
//! `new` (weights seeded) → `train` (iterating) → trained. `predict` is
//! callable as soon as weights exist, but is only meaningful once training has
//! converged. Weight matrices are never resized after construction.
//!
//! ## Numeric hazards
//!
//! Sigmoid outputs are not clamped, so extreme pre-activations saturate to
//! exactly 0 or 1 in floating point and feed `ln(0) = -inf` into the cost.
//! The cost history reports whatever the arithmetic produced; nothing is
//! trapped or repaired.

use crate::dataset::{DatasetProvider, WeightsConsumer};
use crate::matrix::Matrix;
use log::{debug, info};
use rand::Rng;

/// Conventional learning rate used when the embedding application does not
/// override it.
pub const DEFAULT_ALPHA: f64 = 2.5;

/// Conventional L2 regularization strength.
pub const DEFAULT_LAMBDA: f64 = 1.0;

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

/// Weight seeding policy, applied identically to both weight matrices.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WeightInit {
    /// Uniform in `[-eps, eps)` with a fixed small constant.
    Interval(f64),
    /// Uniform in `[-e, e)` with `e = sqrt(6) / sqrt(fan_in + fan_out)`
    /// derived per weight matrix.
    FanScaled,
}

impl WeightInit {
    fn epsilon(self, fan_in: usize, fan_out: usize) -> f64 {
        match self {
            WeightInit::Interval(eps) => eps,
            WeightInit::FanScaled => 6.0_f64.sqrt() / ((fan_in + fan_out) as f64).sqrt(),
        }
    }
}

/// Network hyperparameters, fixed for the life of a trainer.
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    /// Input feature count `n` (pixels per image).
    pub num_features: usize,
    /// Output class count `k`.
    pub num_classes: usize,
    /// Hidden layer size `h`.
    pub hidden_size: usize,
    /// Gradient descent step size `alpha`.
    pub learning_rate: f64,
    /// L2 regularization strength `lambda`.
    pub lambda: f64,
    /// Linear per-iteration adjustment added to `alpha` (annealing); zero
    /// leaves the learning rate constant.
    pub alpha_correction: f64,
    /// Weight seeding policy.
    pub weight_init: WeightInit,
}

impl NetworkConfig {
    /// Configuration for the given topology with conventional defaults:
    /// `alpha = 2.5`, `lambda = 1.0`, no annealing, `[-0.5, 0.5)` seeding.
    pub fn new(num_features: usize, num_classes: usize, hidden_size: usize) -> Self {
        Self {
            num_features,
            num_classes,
            hidden_size,
            learning_rate: DEFAULT_ALPHA,
            lambda: DEFAULT_LAMBDA,
            alpha_correction: 0.0,
            weight_init: WeightInit::Interval(0.5),
        }
    }
}

/// Bias-augmented layer outputs of one forward pass, recomputed every
/// iteration. `a2` is the network output `H`.
struct Activations {
    a0: Matrix,
    a1: Matrix,
    a2: Matrix,
}

/// A fully-connected network with one sigmoid hidden layer, trained by
/// full-batch gradient descent with L2 regularization.
///
/// Owns its weight matrices (`t1`: `h×(n+1)`, `t2`: `k×(h+1)`) and activation
/// caches exclusively; data handed in by the provider is cloned, never
/// mutated.
pub struct TwoLayerNetwork {
    config: NetworkConfig,
    /// Current step size; drifts from `config.learning_rate` when annealing.
    alpha: f64,
    /// Example count `m`.
    num_examples: usize,
    /// Input matrix, `m×n`.
    x: Matrix,
    /// One-hot label matrix, `m×k`.
    y: Matrix,
    t1: Matrix,
    t2: Matrix,
    activations: Option<Activations>,
}

impl TwoLayerNetwork {
    /// Builds a trainer over `data` (`m×n`) and integer `labels` (`m×1`,
    /// values in `[0, k-1]`), seeding both weight matrices through the
    /// injected RNG according to the configured policy.
    ///
    /// # Panics
    /// Panics if the data or label shapes disagree with the configuration.
    pub fn new<R: Rng>(config: NetworkConfig, data: Matrix, labels: Matrix, rng: &mut R) -> Self {
        let (n, k, h) = (config.num_features, config.num_classes, config.hidden_size);
        let e1 = config.weight_init.epsilon(n + 1, h);
        let e2 = config.weight_init.epsilon(h + 1, k);
        let t1 = Matrix::random(h, n + 1, -e1, e1, rng);
        let t2 = Matrix::random(k, h + 1, -e2, e2, rng);
        Self::with_weights(config, data, labels, t1, t2)
    }

    /// Builds a trainer with explicitly supplied weight matrices instead of
    /// random seeding. Deterministic tests inject fixed weights through this.
    ///
    /// # Panics
    /// Panics if any shape disagrees with the configuration: `data` must be
    /// `m×n`, `labels` `m×1`, `t1` `h×(n+1)` and `t2` `k×(h+1)`.
    pub fn with_weights(
        config: NetworkConfig,
        data: Matrix,
        labels: Matrix,
        t1: Matrix,
        t2: Matrix,
    ) -> Self {
        let (n, k, h) = (config.num_features, config.num_classes, config.hidden_size);
        assert_eq!(
            data.columns(),
            n,
            "data has {} feature columns, config expects {n}",
            data.columns()
        );
        assert!(
            labels.is_column() && labels.rows() == data.rows(),
            "labels must be {}x1, got {}x{}",
            data.rows(),
            labels.rows(),
            labels.columns()
        );
        assert_eq!(t1.shape(), (h, n + 1), "t1 must be {}x{}", h, n + 1);
        assert_eq!(t2.shape(), (k, h + 1), "t2 must be {}x{}", k, h + 1);

        let y = Matrix::one_hot(&labels.transpose(), k).transpose();
        Self {
            alpha: config.learning_rate,
            num_examples: data.rows(),
            x: data,
            y,
            t1,
            t2,
            activations: None,
            config,
        }
    }

    /// Builds a trainer over a dataset provider, cloning its matrices.
    pub fn from_provider<R: Rng>(
        config: NetworkConfig,
        provider: &impl DatasetProvider,
        rng: &mut R,
    ) -> Self {
        Self::new(config, provider.images().clone(), provider.labels().clone(), rng)
    }

    /// Runs `iterations` cycles of forward propagation, backpropagation and
    /// gradient descent over the whole training set.
    ///
    /// Returns the regularized cost history: the pre-training cost followed by
    /// the cost after each update (`iterations + 1` values). After each
    /// iteration `alpha` is adjusted by the configured correction.
    pub fn train(&mut self, iterations: usize) -> Vec<f64> {
        let mut cost_history = Vec::with_capacity(iterations + 1);
        info!(
            "training {} examples for {iterations} iterations (alpha = {}, lambda = {})",
            self.num_examples, self.alpha, self.config.lambda
        );

        self.feed_forward();
        cost_history.push(self.cost());

        for i in 0..iterations {
            let (d1, d2) = self.back_propagation();
            self.gradient_descent(&d1, &d2);
            self.feed_forward();
            let cost = self.cost();
            debug!("[{i}] alpha = {}\tcost = {cost}", self.alpha);
            cost_history.push(cost);
            self.alpha += self.config.alpha_correction;
        }

        if let Some(final_cost) = cost_history.last() {
            info!("training finished, final cost = {final_cost}");
        }
        cost_history
    }

    /// Forward propagation over the training set:
    /// `A0 = [1 | X]`, `A1 = [1 | sigmoid(A0·T1ᵗ)]`, `A2 = sigmoid(A1·T2ᵗ)`.
    fn feed_forward(&mut self) {
        let ones = Matrix::ones(self.x.rows(), 1);
        let a0 = ones.concat_h(&self.x);
        let z1 = a0.multiply(&self.t1.transpose());
        let a1 = ones.concat_h(&z1.map(sigmoid));
        let z2 = a1.multiply(&self.t2.transpose());
        let a2 = z2.map(sigmoid);
        self.activations = Some(Activations { a0, a1, a2 });
    }

    /// Regularized cross-entropy cost over all `m×k` output entries.
    ///
    /// Saturated outputs produce `-inf`/NaN terms; they flow straight into
    /// the returned value.
    fn cost(&self) -> f64 {
        let h = &self.current_activations().a2;
        let m = self.num_examples as f64;
        let ones = Matrix::ones(h.rows(), h.columns());

        let positive = self.y.negative().multiply_each_entry(&h.ln());
        let negative = ones.subtract(&self.y).multiply_each_entry(&ones.subtract(h).ln());
        let cross_entropy = positive.subtract(&negative).sum_all() / m;

        cross_entropy + self.regularization()
    }

    /// L2 penalty `(lambda / 2m) · (Σ T1[:,1:]² + Σ T2[:,1:]²)`; the bias
    /// column of each weight matrix is excluded.
    fn regularization(&self) -> f64 {
        let m = self.num_examples as f64;
        let t1 = self.t1.sub_matrix(0, 1).map(|x| x * x).sum_all();
        let t2 = self.t2.sub_matrix(0, 1).map(|x| x * x).sum_all();
        (self.config.lambda / (2.0 * m)) * (t1 + t2)
    }

    /// Batched backpropagation: accumulates the error terms of all examples
    /// through matrix products, averages by `m` and adds the regularization
    /// gradient with the bias columns zeroed.
    ///
    /// Returns the partial derivative matrices for `t1` and `t2`.
    fn back_propagation(&self) -> (Matrix, Matrix) {
        let acts = self.current_activations();
        let m = self.num_examples as f64;

        // d2: m×k output error, d1: m×(h+1) hidden error before dropping bias
        let d2 = acts.a2.subtract(&self.y);
        let ones = Matrix::ones(acts.a1.rows(), acts.a1.columns());
        let d1 = d2
            .multiply(&self.t2)
            .multiply_each_entry(&acts.a1.multiply_each_entry(&ones.subtract(&acts.a1)));

        let delta2 = d2.transpose().multiply(&acts.a1);
        let delta1 = d1.sub_matrix(0, 1).transpose().multiply(&acts.a0);

        let grad1 = delta1.divide_scalar(m).add(&self.regularized_weights(&self.t1));
        let grad2 = delta2.divide_scalar(m).add(&self.regularized_weights(&self.t2));
        (grad1, grad2)
    }

    /// Reference gradient accumulation: an explicit per-example loop over
    /// column vectors, kept as an oracle for cross-checking the batched
    /// formulation. Both produce the same result up to floating-point
    /// summation order.
    #[cfg(test)]
    fn back_propagation_per_example(&self) -> (Matrix, Matrix) {
        let acts = self.current_activations();
        let m = self.num_examples as f64;
        let mut delta1 = Matrix::zeros(self.t1.rows() + 1, self.t1.columns());
        let mut delta2 = Matrix::zeros(self.t2.rows(), self.t2.columns());

        for i in 0..self.num_examples {
            let a0 = acts.a0.row(i).transpose();
            let a1 = acts.a1.row(i).transpose();
            let a2 = acts.a2.row(i).transpose();
            let y = self.y.row(i).transpose();

            let d2 = a2.subtract(&y);
            let d1 = self
                .t2
                .transpose()
                .multiply(&d2)
                .multiply_each_entry(&a1.multiply_each_entry(&a1.negative().add_scalar(1.0)));

            delta2 = delta2.add(&d2.multiply(&a1.transpose()));
            delta1 = delta1.add(&d1.multiply(&a0.transpose()));
        }

        let grad1 = delta1
            .sub_matrix(1, 0)
            .divide_scalar(m)
            .add(&self.regularized_weights(&self.t1));
        let grad2 = delta2.divide_scalar(m).add(&self.regularized_weights(&self.t2));
        (grad1, grad2)
    }

    /// `(lambda / m) · W` with the bias column zeroed out.
    fn regularized_weights(&self, weights: &Matrix) -> Matrix {
        let mut reg = weights.clone();
        reg.set_column_value(0, 0.0);
        reg.multiply_scalar(self.config.lambda / self.num_examples as f64)
    }

    /// In-place weight update: `w ← w - alpha·d + (lambda/m)·w` per entry.
    ///
    /// The trailing `(lambda/m)·w` term applies L2 on top of the already
    /// regularized gradient, so the penalty influences the step twice. The
    /// rule is kept exactly as stated because changing it changes observable
    /// convergence; both weight matrices use it identically.
    fn gradient_descent(&mut self, d1: &Matrix, d2: &Matrix) {
        let alpha = self.alpha;
        let shrink = self.config.lambda / self.num_examples as f64;
        update_weights(&mut self.t1, d1, alpha, shrink);
        update_weights(&mut self.t2, d2, alpha, shrink);
    }

    fn current_activations(&self) -> &Activations {
        self.activations
            .as_ref()
            .expect("feed_forward must run before using activations")
    }

    /// Predicts one class index per row of `x` using the trainer's current
    /// weights. Only meaningful once training has converged.
    pub fn predict(&self, x: &Matrix) -> Matrix {
        predict_with(x, &self.t1, &self.t2)
    }

    /// The trained weight matrices `(t1, t2)`.
    pub fn weights(&self) -> (&Matrix, &Matrix) {
        (&self.t1, &self.t2)
    }

    /// Hands the current weight matrices to an external consumer
    /// (persistence is the consumer's concern).
    pub fn export_weights(&self, consumer: &mut impl WeightsConsumer) {
        consumer.accept(&self.t1, &self.t2);
    }
}

fn update_weights(weights: &mut Matrix, gradient: &Matrix, alpha: f64, shrink: f64) {
    for r in 0..weights.rows() {
        for c in 0..weights.columns() {
            let theta = weights.get(r, c);
            weights.set(r, c, theta - alpha * gradient.get(r, c) + shrink * theta);
        }
    }
}

/// Runs forward propagation over `x` with externally supplied weights and
/// reduces the output by per-row argmax, yielding an `m×1` matrix of class
/// indices.
///
/// Exactly equal class scores resolve to the **last** tied index, per the
/// matrix engine's `>=` max scan.
pub fn predict_with(x: &Matrix, t1: &Matrix, t2: &Matrix) -> Matrix {
    let ones = Matrix::ones(x.rows(), 1);
    let a0 = ones.concat_h(x);
    let a1 = ones.concat_h(&a0.multiply(&t1.transpose()).map(sigmoid));
    let a2 = a1.multiply(&t2.transpose()).map(sigmoid);
    a2.index_max_by_row()
}

/// Counts the rows where the predicted class index equals the true label.
/// Both arguments are `m×1` column vectors; there is no partial credit.
///
/// # Panics
/// Panics if the two vectors disagree in length.
pub fn count_correct_predictions(predictions: &Matrix, labels: &Matrix) -> usize {
    assert_eq!(
        predictions.rows(),
        labels.rows(),
        "predictions ({}) and labels ({}) disagree in length",
        predictions.rows(),
        labels.rows()
    );
    (0..predictions.rows())
        .filter(|&i| predictions.get(i, 0) == labels.get(i, 0))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::approx::{ApproxEquality, approx_eq, approx_eq_within};
    use crate::matrix;

    fn fixture() -> TwoLayerNetwork {
        // 4 examples, 3 features, 2 classes, hidden size 2
        let data = matrix!([
            [0.1, 0.9, 0.2],
            [0.8, 0.1, 0.7],
            [0.2, 0.7, 0.1],
            [0.9, 0.2, 0.8],
        ]);
        let labels = matrix!([[0.0], [1.0], [0.0], [1.0]]);
        let t1 = matrix!([[0.1, -0.2, 0.3, 0.05], [-0.15, 0.25, -0.1, 0.2]]);
        let t2 = matrix!([[0.2, -0.3, 0.1], [-0.1, 0.15, 0.25]]);
        let config = NetworkConfig::new(3, 2, 2);
        TwoLayerNetwork::with_weights(config, data, labels, t1, t2)
    }

    #[test]
    fn batched_backprop_matches_per_example_oracle() {
        let mut nn = fixture();
        nn.feed_forward();

        let (batched1, batched2) = nn.back_propagation();
        let (looped1, looped2) = nn.back_propagation_per_example();

        assert_eq!(batched1.shape(), looped1.shape());
        assert_eq!(batched2.shape(), looped2.shape());
        assert!(approx_eq(batched1.as_slice(), looped1.as_slice()));
        assert!(approx_eq(batched2.as_slice(), looped2.as_slice()));
    }

    #[test]
    fn oracle_agreement_survives_training_steps() {
        let mut nn = fixture();
        nn.train(3);

        // summation-order differences accumulate over the steps, so accept
        // the next grade down from bit-level agreement
        let (batched1, batched2) = nn.back_propagation();
        let (looped1, looped2) = nn.back_propagation_per_example();
        assert!(approx_eq_within(
            batched1.as_slice(),
            looped1.as_slice(),
            ApproxEquality::Partial
        ));
        assert!(approx_eq_within(
            batched2.as_slice(),
            looped2.as_slice(),
            ApproxEquality::Partial
        ));
    }
}
