use microgd::{
  ops::*,
  regression::{ BatchLoader, TrainConfig, TrainState, train },
  Tensor,
};

// Run with `RUST_LOG=debug` to see every prediction, loss and weight update.
// An optional argument names a JSON file with a training configuration.

fn main() -> microgd::Result<()> {
  env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

  let config = match std::env::args().nth(1) {
    Some(path) => TrainConfig::from_file(path)?,
    None => TrainConfig::default(),
  };

  // Samples of y = 2x + 1
  let inputs = Tensor::arrange(&[16, 1], -1.0, 0.125);
  let targets = (&inputs * 2.0 + 1.0).reshape(&[16]);
  let loader = BatchLoader::new(inputs, targets, 4)?;

  let mut state = TrainState::<f32>::from_config(&config)?;
  println!("Initial {}", state.params);

  let report = train(&mut state, &loader, config.num_epochs)?;

  println!("Trained {} ({} steps)", state.params, report.steps);
  if let Some(loss) = report.final_loss() {
    println!("Final loss {loss:.4}");
  }

  Ok(())
}
