//! Basic example demonstrating sequence model training and reconstruction
//!
//! Run with: cargo run --example basic -p cablesense-recurrent

use recurrent::{Trainer, TrainerConfig};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== cablesense-recurrent Basic Examples ===\n");

    // A smooth force series with one corrupted reading at index 42
    let mut values: Vec<f64> = (0..80)
        .map(|i| 2000.0 + 55.0 * (i as f64 * 0.2).sin())
        .collect();
    let observed = values[42];
    values[42] = 320.0;

    println!("Series length: {}", values.len());
    println!("Corrupted reading at index 42: {:.1} (was {:.1})\n", values[42], observed);

    // 1. Training
    println!("1. Training (window=10, hidden=20, 30 epochs)");
    let config = TrainerConfig {
        window: 10,
        hidden: 20,
        epochs: 30,
        seed: Some(42),
        ..TrainerConfig::default()
    };
    let trainer = Trainer::new(config)?;
    let model = trainer.fit(&values)?;
    println!("   Trained on {} pairs", model.trained_pairs());
    println!("   Scaler range: [{:.1}, {:.1}]\n", model.scaler().min(), model.scaler().max());

    // 2. Reconstruction
    println!("2. Reconstruction");
    let restored = model.reconstruct(&values, 42)?;
    println!("   Model output for index 42: {:.1}", restored);
    println!("   Uncorrupted value was:     {:.1}", observed);

    // The corrupted value itself never feeds the prediction
    let mut tampered = values.clone();
    tampered[42] = -5000.0;
    let same = model.reconstruct(&tampered, 42)?;
    println!("   Output with the reading changed: {:.1} (unchanged)", same);

    println!("\n=== Examples Complete ===");
    Ok(())
}
