//! Trains the classifier on a tiny synthetic "image" set: 8x8 grayscale
//! squares that are bright either in the top or the bottom half.
//!
//! Run with `RUST_LOG=debug cargo run --example synthetic` to see the cost
//! per iteration.

use perceptra::dataset::{DatasetProvider, InMemoryDataset};
use perceptra::matrix::Matrix;
use perceptra::network::{NetworkConfig, TwoLayerNetwork, count_correct_predictions};
use rand::{Rng, SeedableRng, rngs::StdRng};

const SIDE: usize = 8;
const EXAMPLES: usize = 64;

fn synthetic_dataset(rng: &mut impl Rng) -> InMemoryDataset {
    let mut images = Matrix::new(EXAMPLES, SIDE * SIDE);
    let mut labels = Matrix::new(EXAMPLES, 1);

    for i in 0..EXAMPLES {
        let class = i % 2;
        for p in 0..SIDE * SIDE {
            let in_bright_half = (p < SIDE * SIDE / 2) == (class == 0);
            let base = if in_bright_half { 0.8 } else { 0.1 };
            images.set(i, p, base + rng.random_range(0.0..0.1));
        }
        labels.set(i, 0, class as f64);
    }

    InMemoryDataset::new(images, labels)
}

fn main() {
    env_logger::init();

    let mut rng = StdRng::seed_from_u64(1);
    let dataset = synthetic_dataset(&mut rng);

    let mut config = NetworkConfig::new(SIDE * SIDE, 2, 16);
    config.learning_rate = 1.0;
    config.lambda = 0.1;

    let mut nn = TwoLayerNetwork::from_provider(config, &dataset, &mut rng);
    let history = nn.train(100);

    println!("cost: {:.6} -> {:.6}", history[0], history.last().unwrap());

    let predictions = nn.predict(dataset.images());
    let correct = count_correct_predictions(&predictions, dataset.labels());
    println!(
        "accuracy: {correct}/{} ({:.1}%)",
        dataset.len(),
        100.0 * correct as f64 / dataset.len() as f64
    );
}
