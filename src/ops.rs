use crate::internal::*;
use crate::Shape;
use crate::scalar::{ Inner, Numeric, Real };


/// Low-level compute kernels.

pub trait Cops<I: Numeric> {
  fn matmul(&self, rhs: &Self) -> Vec<I>;
}


/// Differentiable mid-level operations that are also implemented
/// for non-differentiable [Inner] types.

pub trait BaseOps<I: Inner>: Clone {
  fn scalar(item: I) -> Self;
  fn shape(&self) -> &Shape;
  fn broadcast(&self, shape: &Shape) -> Self;
  fn reshape(&self, dims: &[usize]) -> Self;
  fn transpose(&self, dim1: isize, dim2: isize) -> Self;
}


/// Differentiable mid-level operations that are also implemented
/// for non-differentiable [Numeric] inner types.

pub trait NumericOps<I: Numeric>: Sized {
  /// Collapse all dimensions from `dim` onwards by summing them up.
  fn sum(&self, dim: isize) -> Self;
  /// Matrix product of two rank-2 operands.
  fn mm(&self, rhs: &Self) -> Self;
}


/// Differentiable mid-level operations.

pub trait RealOps<I: Real> {
  fn pow(&self, rhs: &Self) -> Self;
}


/// High-level operations, implemented exclusively on top of
/// the mid-level ones. As a result, these are all
/// differentiable when called on a [Variable](crate::Variable).

pub trait Hops<I>: BaseOps<I> + NumericOps<I> + RealOps<I>
where
  I: Real,
  Self: std::ops::Div<I, Output = Self>,
{
  fn powf(&self, exp: I) -> Self {
    self.pow(&Self::scalar(exp))
  }

  fn sqr(&self) -> Self {
    self.powf(I::from(2.0).unwrap())
  }

  fn mean(&self, dim: isize) -> Self {
    let udim = negative_index(dim, self.shape().rank(), false);
    let n: usize = self.shape().dims[udim..].iter().product();
    self.sum(dim) / I::from(n).unwrap()
  }
}


#[cfg(test)]
mod tests {
  use super::*;
  use crate::Tensor;

  #[test]
  fn mean() {
    let a = Tensor::new(&[3,2], vec![1., 2., 3., 4., 5., 6.]).trained();
    assert_eq!(a.mean(0).tensor(), &Tensor::new(&[], vec![3.5]));
    assert_eq!(a.mean(-1).tensor(), &Tensor::vec(&[1.5, 3.5, 5.5]));
  }

  #[test]
  fn sqr() {
    let a = Tensor::vec(&[-2.0, 3.0]);
    assert_eq!(a.sqr(), Tensor::vec(&[4.0, 9.0]));
  }
}
