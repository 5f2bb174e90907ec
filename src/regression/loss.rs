use log::debug;

use crate::{
  error::{ Error, Result },
  ops::{ BaseOps, Hops },
  scalar::Real,
  Tensor, Variable,
};


/// Mean squared error `mean((prediction - target)^2)` as a scalar.
///
/// The target may have any shape holding the same number of elements as
/// the prediction; it gets reshaped to match, so `[N]` targets pair up
/// with `[N, 1]` predictions element by element instead of broadcasting.

pub fn mse_loss<T: Real>(prediction: &Variable<T>, target: &Tensor<T>) -> Result<Variable<T>> {
  debug!("loss calculation {} {}", prediction, target);
  if prediction.size() != target.size() {
    return Err(Error::ShapeMismatch {
      expected: prediction.shape().dims.clone(),
      got: target.shape().dims.clone(),
    })
  }
  if prediction.size() == 0 { return Err(Error::EmptyBatch) }
  let target = target.reshape(&prediction.shape().dims).tracked();
  Ok((prediction - &target).sqr().mean(0))
}


#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn mean_of_squares() {
    let prediction = Tensor::new(&[2,1], vec![1.0, 4.0]).tracked();
    let target = Tensor::vec(&[3.0, 4.0]);
    let loss = mse_loss(&prediction, &target).unwrap();
    assert_eq!(loss.shape().rank(), 0);
    assert_eq!(loss.item(), 2.0);
  }

  #[test]
  fn non_negative() {
    let prediction = Tensor::<f64>::randn(&[16,1]).tracked();
    let target = Tensor::randn(&[16]);
    assert!(mse_loss(&prediction, &target).unwrap().item() >= 0.0);
    assert_eq!(mse_loss(&prediction, &prediction).unwrap().item(), 0.0);
  }

  #[test]
  fn gradient() {
    let prediction = Tensor::new(&[2,1], vec![1.0, 4.0]).trained();
    let target = Tensor::vec(&[3.0, 4.0]);
    mse_loss(&prediction, &target).unwrap().backward().unwrap();
    // d/dp mean((p - t)^2) = 2 (p - t) / n
    assert_eq!(prediction.grad(), Some(&Tensor::new(&[2,1], vec![-2.0, 0.0])));
  }

  #[test]
  fn mismatched_target() {
    let prediction = Tensor::new(&[2,1], vec![1.0, 4.0]).tracked();
    let target = Tensor::vec(&[3.0, 4.0, 5.0]);
    assert!(matches!(mse_loss(&prediction, &target), Err(Error::ShapeMismatch { .. })));
  }

  #[test]
  fn empty_batch() {
    let prediction = Tensor::<f32>::zeros(&[0,1]).tracked();
    let target = Tensor::zeros(&[0]);
    assert!(matches!(mse_loss(&prediction, &target), Err(Error::EmptyBatch)));
  }
}
