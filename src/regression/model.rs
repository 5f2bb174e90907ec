use log::trace;

use crate::{
  error::{ Error, Result },
  ops::{ BaseOps, NumericOps },
  scalar::Real,
  regression::Params,
  Variable,
};


/// Affine model `input × weight + bias`, with the bias broadcast across rows.
///
/// Takes an `[N, 1]` input and produces an `[N, 1]` prediction.

pub fn model<T: Real>(params: &Params<T>, input: &Variable<T>) -> Result<Variable<T>> {
  let features = params.weight().size();
  if input.rank() != 2 || input.dim(-1) != features {
    let rows = if input.rank() == 0 { 0 } else { input.dim(0) };
    return Err(Error::ShapeMismatch {
      expected: vec![rows, features],
      got: input.shape().dims.clone(),
    })
  }
  let weight = params.weight().reshape(&[features, 1]);
  let prediction = input.mm(&weight) + params.bias();
  trace!("prediction {prediction}");
  Ok(prediction)
}


#[cfg(test)]
mod tests {
  use super::*;
  use crate::Tensor;

  #[test]
  fn affine() {
    let params = Params::from_values(2.0, 0.5);
    let input = Tensor::new(&[3,1], vec![1.0, 2.0, -1.0]).tracked();
    let prediction = model(&params, &input).unwrap();
    assert_eq!(prediction.tensor(), &Tensor::new(&[3,1], vec![2.5, 4.5, -1.5]));
  }

  #[test]
  fn gradient_reaches_parameters() {
    let params = Params::from_values(2.0, 0.5);
    let input = Tensor::new(&[2,1], vec![1.0, 3.0]).tracked();
    model(&params, &input).unwrap().sum(0).backward().unwrap();
    assert_eq!(params.weight().grad().unwrap().item(), 4.0);
    assert_eq!(params.bias().grad().unwrap().item(), 2.0);
  }

  #[test]
  fn empty_input() {
    let params = Params::<f32>::from_values(2.0, 0.5);
    let input = Tensor::zeros(&[0,1]).tracked();
    let prediction = model(&params, &input).unwrap();
    assert_eq!(prediction.shape().dims, vec![0,1]);
  }

  #[test]
  fn rejects_wrong_rank() {
    let params = Params::from_values(2.0, 0.5);
    let input = Tensor::vec(&[1.0, 2.0]).tracked();
    assert!(matches!(
      model(&params, &input),
      Err(Error::ShapeMismatch { got, .. }) if got == vec![2]
    ));
  }
}
