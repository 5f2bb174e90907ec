use std::fs;
use std::path::Path;

use log::debug;
use rand::{ SeedableRng, rngs::StdRng };
use serde::{ Serialize, Deserialize, de::DeserializeOwned };

use crate::{
  error::{ Error, Result },
  ops::BaseOps,
  scalar::Real,
  variable::no_grad,
  Tensor, Variable,
};


/// The trainable parameters of the regression: one weight and one bias.

#[derive(Debug, Clone)]
pub struct Params<T: Real> {
  weight: Variable<T>,
  bias: Variable<T>,
}

impl<T: Real> Params<T> {
  /// Draw the weight from a standard normal distribution seeded with `seed`
  /// and start the bias at zero.

  pub fn init(seed: u64) -> Self {
    let mut rng = StdRng::seed_from_u64(seed);
    Self {
      weight: Tensor::randn_with(&[1], &mut rng).trained(),
      bias: Tensor::zeros(&[1]).trained(),
    }
  }

  pub fn from_values(weight: T, bias: T) -> Self {
    Self {
      weight: Tensor::vec(&[weight]).trained(),
      bias: Tensor::vec(&[bias]).trained(),
    }
  }

  pub fn weight(&self) -> &Variable<T> {
    &self.weight
  }

  pub fn bias(&self) -> &Variable<T> {
    &self.bias
  }

  /// Move both parameters against their gradients: `param -= grad * learning_rate`.
  ///
  /// The update runs without gradient tracking, and doesn't reset
  /// the gradients it used. See [zero_grad](Self::zero_grad).

  pub fn step(&mut self, learning_rate: T) -> Result<()> {
    no_grad(|| {
      debug!("weight {}", self.weight);
      for param in [&mut self.weight, &mut self.bias] {
        let change = param.grad()
          .ok_or_else(|| Error::MissingGradient(param.to_string()) )?
          * learning_rate;
        *param -= change;
      }
      debug!("weight now {}", self.weight);
      Ok(())
    })
  }

  pub fn zero_grad(&self) {
    self.weight.zero_grad();
    self.bias.zero_grad();
  }
}

impl<T: Real + Serialize + DeserializeOwned> Params<T> {
  pub fn to_bytes(&self) -> Result<Vec<u8>> {
    let dump = ParamsDump {
      weight: self.weight.detach(),
      bias: self.bias.detach(),
    };
    Ok(postcard::to_allocvec(&dump)?)
  }

  pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
    let dump: ParamsDump<T> = postcard::from_bytes(bytes)?;
    for tensor in [&dump.weight, &dump.bias] {
      if tensor.shape().dims != [1] || !tensor.is_standalone() {
        return Err(Error::ShapeMismatch { expected: vec![1], got: tensor.shape().dims.clone() })
      }
    }
    Ok(Self {
      weight: dump.weight.trained(),
      bias: dump.bias.trained(),
    })
  }

  pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
    Ok(fs::write(path, self.to_bytes()?)?)
  }

  pub fn load(path: impl AsRef<Path>) -> Result<Self> {
    Self::from_bytes(&fs::read(path)?)
  }
}

impl<T: Real> std::fmt::Display for Params<T> {
  fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
    write!(f, "weight {} bias {}", self.weight.item(), self.bias.item())
  }
}

#[derive(Serialize, Deserialize)]
struct ParamsDump<T: Real> {
  weight: Tensor<T>,
  bias: Tensor<T>,
}


#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn seeded_init() {
    let a = Params::<f32>::init(1);
    let b = Params::<f32>::init(1);
    assert_eq!(a.weight().item(), b.weight().item());
    assert_eq!(a.bias().item(), 0.0);
    assert_eq!(a.weight().shape().dims, vec![1]);
    assert!(a.weight().is_trainable() && a.bias().is_trainable());
    assert_ne!(a.weight().item(), Params::<f32>::init(2).weight().item());
  }

  #[test]
  fn step_applies_learning_rate() {
    let mut params = Params::from_values(1.0, 0.5);
    params.weight().grad().unwrap().assign(&Tensor::vec(&[2.0]));
    params.bias().grad().unwrap().assign(&Tensor::vec(&[-4.0]));
    params.step(0.25).unwrap();
    assert_eq!(params.weight().item(), 0.5);
    assert_eq!(params.bias().item(), 1.5);
    // Gradients survive the step until reset explicitly
    assert_eq!(params.weight().grad().unwrap().item(), 2.0);
    params.zero_grad();
    assert_eq!(params.weight().grad().unwrap().item(), 0.0);
    assert_eq!(params.bias().grad().unwrap().item(), 0.0);
  }

  #[test]
  fn snapshot_restores_values() {
    let params = Params::<f64>::init(3);
    let restored = Params::<f64>::from_bytes(&params.to_bytes().unwrap()).unwrap();
    assert_eq!(restored.weight().item(), params.weight().item());
    assert_eq!(restored.bias().item(), params.bias().item());
    assert!(restored.weight().is_trainable());
  }

  #[test]
  fn snapshot_rejects_garbage() {
    assert!(Params::<f64>::from_bytes(&[1, 2, 3]).is_err());
  }
}
