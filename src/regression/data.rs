use crate::{
  error::{ Error, Result },
  scalar::Real,
  Tensor,
};


/// Input samples together with the values the model should predict for them.

#[derive(Debug, Clone, PartialEq)]
pub struct Batch<T: Real> {
  pub input: Tensor<T>,
  pub target: Tensor<T>,
}

impl<T: Real> Batch<T> {
  pub fn new(input: Tensor<T>, target: Tensor<T>) -> Self {
    Self { input, target }
  }
}


/// Source of training batches.
///
/// The trainer asks for a fresh pass at the start of every epoch. Batch
/// size, ordering and shuffling are entirely up to the implementation.

pub trait DataLoader<T: Real> {
  fn batches(&self) -> Box<dyn Iterator<Item = Batch<T>> + '_>;
}

impl<T: Real> DataLoader<T> for [Batch<T>] {
  fn batches(&self) -> Box<dyn Iterator<Item = Batch<T>> + '_> {
    Box::new(self.iter().cloned())
  }
}

impl<T: Real> DataLoader<T> for Vec<Batch<T>> {
  fn batches(&self) -> Box<dyn Iterator<Item = Batch<T>> + '_> {
    self.as_slice().batches()
  }
}


/// Splits a dataset into consecutive batches along its first dimension,
/// in storage order.
///
/// The final batch holds the remainder when the sample count isn't a
/// multiple of the batch size.

#[derive(Debug, Clone)]
pub struct BatchLoader<T: Real> {
  inputs: Tensor<T>,
  targets: Tensor<T>,
  batch_size: usize,
}

impl<T: Real> BatchLoader<T> {
  pub fn new(inputs: Tensor<T>, targets: Tensor<T>, batch_size: usize) -> Result<Self> {
    let samples = |t: &Tensor<T>| if t.rank() == 0 { 0 } else { t.dim(0) };
    if inputs.rank() == 0 || samples(&inputs) != samples(&targets) {
      return Err(Error::ShapeMismatch {
        expected: vec![samples(&inputs)],
        got: vec![samples(&targets)],
      })
    }
    if batch_size == 0 {
      return Err(Error::Config("batch_size must be at least 1".into()))
    }
    Ok(Self { inputs, targets, batch_size })
  }

  pub fn len(&self) -> usize {
    (self.inputs.dim(0) + self.batch_size - 1) / self.batch_size
  }

  pub fn is_empty(&self) -> bool {
    self.inputs.dim(0) == 0
  }
}

impl<T: Real> DataLoader<T> for BatchLoader<T> {
  fn batches(&self) -> Box<dyn Iterator<Item = Batch<T>> + '_> {
    let inputs = self.inputs.chunks(self.batch_size);
    let targets = self.targets.chunks(self.batch_size);
    Box::new(inputs.into_iter()
      .zip(targets)
      .map(|(input, target)| Batch::new(input, target) ))
  }
}


#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn vec_loader_replays() {
    let loader = vec![
      Batch::new(Tensor::new(&[1,1], vec![-0.5]), Tensor::vec(&[5.0])),
      Batch::new(Tensor::new(&[1,1], vec![1.0]), Tensor::vec(&[8.0])),
    ];
    assert_eq!(loader.batches().count(), 2);
    assert_eq!(loader.batches().next(), loader.batches().next());
  }

  #[test]
  fn sequential_batches() {
    let inputs = Tensor::arrange(&[5,1], 0.0, 1.0);
    let targets = Tensor::arrange(&[5], 10.0, 1.0);
    let loader = BatchLoader::new(inputs, targets, 2).unwrap();
    assert_eq!(loader.len(), 3);
    let batches: Vec<_> = loader.batches().collect();
    assert_eq!(batches[0].input, Tensor::new(&[2,1], vec![0.0, 1.0]));
    assert_eq!(batches[1].target, Tensor::vec(&[12.0, 13.0]));
    assert_eq!(batches[2].input, Tensor::new(&[1,1], vec![4.0]));
  }

  #[test]
  fn mismatched_lengths() {
    let inputs = Tensor::zeros(&[3,1]);
    let targets = Tensor::zeros(&[2]);
    assert!(matches!(BatchLoader::<f64>::new(inputs, targets, 1), Err(Error::ShapeMismatch { .. })));
  }

  #[test]
  fn zero_batch_size() {
    let inputs = Tensor::zeros(&[3,1]);
    let targets = Tensor::zeros(&[3]);
    assert!(matches!(BatchLoader::<f32>::new(inputs, targets, 0), Err(Error::Config(_))));
  }
}
