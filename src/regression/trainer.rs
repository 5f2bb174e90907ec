use log::{ debug, info, warn, log, Level };

use crate::{
  error::{ Error, Result },
  scalar::Real,
  variable::no_grad,
  regression::{ Batch, DataLoader, Params, TrainConfig, mse_loss, model },
};


/// Everything a training run mutates, owned by the caller.

#[derive(Debug, Clone)]
pub struct TrainState<T: Real> {
  pub params: Params<T>,
  pub learning_rate: T,
  /// Epochs that are a multiple of this get their summary logged at info level.
  pub log_epochs: usize,
  /// Number of parameter updates performed so far.
  pub steps: usize,
}

impl<T: Real> TrainState<T> {
  pub fn new(params: Params<T>, learning_rate: T) -> Self {
    Self { params, learning_rate, log_epochs: 10, steps: 0 }
  }

  pub fn from_config(config: &TrainConfig) -> Result<Self> {
    config.validate()?;
    let learning_rate = T::from(config.learning_rate)
      .ok_or_else(|| Error::Config(format!("learning_rate {} is not representable", config.learning_rate)) )?;
    Ok(Self {
      log_epochs: config.log_epochs,
      ..Self::new(Params::init(config.seed), learning_rate)
    })
  }
}


#[derive(Debug, Clone, PartialEq)]
pub struct EpochSummary<T: Real> {
  pub epoch: usize,
  pub batches: usize,
  /// Loss of the epoch's final batch.
  pub last_loss: Option<T>,
}


#[derive(Debug, Clone, PartialEq)]
pub struct TrainReport<T: Real> {
  pub epochs: Vec<EpochSummary<T>>,
  pub steps: usize,
}

impl<T: Real> TrainReport<T> {
  pub fn final_loss(&self) -> Option<T> {
    self.epochs.iter().rev().find_map(|epoch| epoch.last_loss )
  }
}


/// Run one gradient descent step on a single batch and return its loss.
///
/// Gradients of both parameters are back to zero when this returns.
/// A batch without samples fails with [Error::EmptyBatch] and leaves
/// the parameters untouched.

pub fn train_step<T: Real>(state: &mut TrainState<T>, batch: &Batch<T>) -> Result<T> {
  let input = batch.input.tracked();
  let prediction = model(&state.params, &input)?;
  debug!("prediction {prediction}");
  let loss = mse_loss(&prediction, &batch.target)?;
  debug!("loss {loss}");
  loss.backward()?;

  let params = &mut state.params;
  let learning_rate = state.learning_rate;
  no_grad(|| {
    params.step(learning_rate)?;
    params.zero_grad();
    Ok::<_, Error>(())
  })?;
  state.steps += 1;

  Ok(loss.item())
}


/// Train for `num_epochs` full passes over `loader`.
///
/// The first failing batch aborts the run with its error.

pub fn train<T, L>(state: &mut TrainState<T>, loader: &L, num_epochs: usize) -> Result<TrainReport<T>>
where
  T: Real,
  L: DataLoader<T> + ?Sized,
{
  let steps_before = state.steps;
  let mut epochs = Vec::with_capacity(num_epochs);

  for epoch in 0..num_epochs {
    let mut summary = EpochSummary { epoch, batches: 0, last_loss: None };
    for batch in loader.batches() {
      summary.last_loss = Some(train_step(state, &batch)?);
      summary.batches += 1;
    }

    match summary.last_loss {
      Some(loss) => {
        let level = if epoch % state.log_epochs.max(1) == 0 || epoch + 1 == num_epochs {
          Level::Info
        } else {
          Level::Debug
        };
        log!(level, "Epoch {epoch}  Loss {loss:.4}");
      },
      None => warn!("Epoch {epoch} had no batches"),
    }
    epochs.push(summary);
  }

  let steps = state.steps - steps_before;
  info!("Finished {num_epochs} epochs in {steps} steps: {}", state.params);
  Ok(TrainReport { epochs, steps })
}


#[cfg(test)]
mod tests {
  use super::*;
  use crate::{ Tensor, ops::BaseOps, regression::BatchLoader };

  fn scenario() -> Batch<f64> {
    Batch::new(Tensor::new(&[1,1], vec![-0.5]), Tensor::vec(&[5.0]))
  }

  #[test]
  fn single_step_follows_gradient() {
    let mut state = TrainState::new(Params::from_values(0.66, 0.0), 0.001);
    let batch = scenario();

    let prediction = -0.5 * 0.66;
    let expected_loss = (prediction - 5.0) * (prediction - 5.0);
    let grad_weight = 2.0 * (prediction - 5.0) * -0.5;
    let grad_bias = 2.0 * (prediction - 5.0);

    let loss = train_step(&mut state, &batch).unwrap();
    assert!((loss - expected_loss).abs() < 1e-12);
    assert!((state.params.weight().item() - (0.66 - 0.001 * grad_weight)).abs() < 1e-12);
    assert!((state.params.bias().item() - (0.0 - 0.001 * grad_bias)).abs() < 1e-12);
    assert_eq!(state.steps, 1);

    // Weight moved against a positive gradient, which lowers the loss
    assert!(state.params.weight().item() < 0.66);
    let input = batch.input.tracked();
    let after = mse_loss(&model(&state.params, &input).unwrap(), &batch.target).unwrap();
    assert!(after.item() < loss);
  }

  #[test]
  fn gradients_zeroed_after_step() {
    let mut state = TrainState::new(Params::from_values(0.66, 0.0), 0.001);
    train_step(&mut state, &scenario()).unwrap();
    assert_eq!(state.params.weight().grad().unwrap().item(), 0.0);
    assert_eq!(state.params.bias().grad().unwrap().item(), 0.0);
  }

  #[test]
  fn repeated_steps_do_not_accumulate() {
    let mut state = TrainState::new(Params::from_values(0.66, 0.0), 0.001);
    train_step(&mut state, &scenario()).unwrap();
    let weight = state.params.weight().item();
    let bias = state.params.bias().item();

    train_step(&mut state, &scenario()).unwrap();
    let prediction = -0.5 * weight + bias;
    let expected = weight - 0.001 * 2.0 * (prediction - 5.0) * -0.5;
    assert!((state.params.weight().item() - expected).abs() < 1e-12);
    assert_eq!(state.steps, 2);
  }

  #[test]
  fn zero_epochs_do_nothing() {
    let mut state = TrainState::new(Params::from_values(0.66, 0.0), 0.001);
    let report = train(&mut state, &vec![scenario()], 0).unwrap();
    assert_eq!(report.steps, 0);
    assert!(report.epochs.is_empty());
    assert_eq!(report.final_loss(), None);
    assert_eq!(state.params.weight().item(), 0.66);
    assert_eq!(state.params.bias().item(), 0.0);
  }

  #[test]
  fn report_per_epoch() {
    let mut state = TrainState::new(Params::from_values(0.66, 0.0), 0.001);
    let loader = vec![
      scenario(),
      Batch::new(Tensor::new(&[1,1], vec![1.0]), Tensor::vec(&[8.0])),
    ];
    let report = train(&mut state, &loader, 2).unwrap();
    assert_eq!(report.steps, 4);
    assert_eq!(state.steps, 4);
    assert_eq!(report.epochs.len(), 2);
    assert_eq!(report.epochs[1].epoch, 1);
    assert_eq!(report.epochs[1].batches, 2);
    assert!(report.final_loss().unwrap() > 0.0);
  }

  #[test]
  fn empty_loader() {
    let mut state = TrainState::new(Params::<f32>::from_values(0.66, 0.0), 0.001);
    let report = train(&mut state, &Vec::<Batch<f32>>::new(), 3).unwrap();
    assert_eq!(report.steps, 0);
    assert_eq!(report.epochs.len(), 3);
    assert!(report.epochs.iter().all(|epoch| epoch.last_loss.is_none() ));
  }

  #[test]
  fn converges_on_line() {
    let xs = Tensor::<f64>::arrange(&[8,1], -1.0, 0.25);
    let ys = (&xs * 2.0 + 1.0).reshape(&[8]);
    let loader = BatchLoader::new(xs, ys, 2).unwrap();
    let mut state = TrainState::new(Params::from_values(0.0, 0.0), 0.1);
    let report = train(&mut state, &loader, 300).unwrap();
    assert_eq!(report.steps, 1200);
    assert!((state.params.weight().item() - 2.0).abs() < 1e-2);
    assert!((state.params.bias().item() - 1.0).abs() < 1e-2);
    assert!(report.final_loss().unwrap() < 1e-4);
  }

  #[test]
  fn shape_errors_abort() {
    let mut state = TrainState::new(Params::from_values(0.66, 0.0), 0.001);
    let loader = vec![Batch::new(Tensor::vec(&[1.0, 2.0]), Tensor::vec(&[1.0, 2.0]))];
    assert!(matches!(train(&mut state, &loader, 1), Err(Error::ShapeMismatch { .. })));
    assert_eq!(state.steps, 0);
  }

  #[test]
  fn empty_batch_aborts() {
    let mut state = TrainState::new(Params::from_values(0.66, 0.0), 0.001);
    let loader = vec![Batch::new(Tensor::zeros(&[0,1]), Tensor::zeros(&[0]))];
    assert!(matches!(train(&mut state, &loader, 1), Err(Error::EmptyBatch)));
    assert_eq!(state.steps, 0);
    assert_eq!(state.params.weight().item(), 0.66);
    assert_eq!(state.params.bias().item(), 0.0);
  }

  #[test]
  fn from_config() {
    let config = TrainConfig { seed: 5, ..TrainConfig::default() };
    let a = TrainState::<f64>::from_config(&config).unwrap();
    let b = TrainState::<f64>::from_config(&config).unwrap();
    assert_eq!(a.params.weight().item(), b.params.weight().item());
    assert_eq!(a.learning_rate, 0.001);
    assert_eq!(a.log_epochs, 10);

    let config = TrainConfig { learning_rate: 0.0, ..TrainConfig::default() };
    assert!(TrainState::<f64>::from_config(&config).is_err());
  }
}
