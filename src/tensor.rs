use std::rc::Rc;
use std::cell::{ Ref, RefCell };

use itertools::Itertools;
use rand::Rng;
use serde::{ Serialize, Deserialize };

mod cops;
mod lops;

use crate::{
  internal::*,
  shape::Shape,
  variable::Variable,
  scalar::{ Inner, Numeric, Real },
  ops::{ BaseOps, Hops },
};


/// Multidimensional array.
///
/// Tensors may contain any type that satisfies [Inner], but
/// additional methods are available for [Numeric] and [Real] inner types.
///
/// Clones and views share their storage, so writing to one of them
/// through [assign](Tensor::assign) or [op_assign](Tensor::op_assign)
/// is visible through all of them.
///
/// [Real] tensor types can be wrapped in a [Variable] by
/// calling [tracked](Tensor::tracked) or [trained](Tensor::trained).

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tensor<T: Inner> {
  shape: Shape,
  data: Rc<RefCell<Vec<T>>>,
}

impl<T: Real> Hops<T> for Tensor<T> {}

impl<T: Inner> PartialEq for Tensor<T> {
  fn eq(&self, rhs: &Self) -> bool {
    if self.shape.dims != rhs.shape.dims { return false }
    let data_l = self.data.borrow();
    let data_r = rhs.data.borrow();
    self.shape.iter()
      .zip(rhs.shape.iter())
      .all(|(i, j)| data_l[i] == data_r[j] )
  }
}

impl<T: Inner> Tensor<T> {
  pub fn from_shape(shape: Shape, data: Vec<T>) -> Self {
    assert_eq!(shape.size(), data.len(),
      "{} doesn't match data length {}", shape, data.len());
    Self { shape, data: Rc::new(RefCell::new(data)) }
  }

  pub fn new(shape: &[usize], data: Vec<T>) -> Self {
    Self::from_shape(Shape::new(shape), data)
  }

  pub fn vec(vec: &[T]) -> Self {
    Self::new(&[vec.len()], vec.to_vec())
  }

  pub fn fill(shape: &[usize], filler: T) -> Self {
    Self::new(shape, vec![filler; shape.iter().product()])
  }

  pub fn raw(&self) -> Ref<Vec<T>> {
    self.data.borrow()
  }

  pub fn size(&self) -> usize {
    self.shape.size()
  }

  pub fn rank(&self) -> usize {
    self.shape.rank()
  }

  pub fn dim(&self, dim: isize) -> usize {
    self.shape[dim]
  }

  /// Extract the only value of a single-element tensor.

  pub fn item(&self) -> T {
    assert!(self.size() == 1,
      "Can't extract item from {} tensor", self.shape);
    self.raw()[self.shape.offset]
  }

  pub fn contiguous(&self) -> Self {
    if self.shape.contiguous() {
      self.clone()
    } else {
      self.detach()
    }
  }

  /// Copy this tensor's elements into fresh storage.

  pub fn detach(&self) -> Self {
    self.vectorize(|a| a )
  }

  /// Whether this tensor addresses all of its storage, in order.

  pub fn is_standalone(&self) -> bool {
    self.shape.contiguous()
      && self.shape.offset == 0
      && self.shape.size() == self.data.borrow().len()
  }

  pub fn shared_with(&self, other: &Self) -> bool {
    Rc::ptr_eq(&self.data, &other.data)
  }

  pub fn zip<O,F>(&self, rhs: &Self, cb: F) -> Tensor<O>
  where
    O: Inner,
    F: Fn((T, T)) -> O,
  {
    let lhs = self.broadcast(&rhs.shape);
    let rhs = rhs.broadcast(&self.shape);
    let data: Vec<O> = lhs.param_iter()
      .zip(rhs.param_iter())
      .map(cb)
      .collect();
    Tensor::new(&lhs.shape.dims, data)
  }

  pub fn vectorize<O,F>(&self, cb: F) -> Tensor<O>
  where
    O: Inner,
    F: FnMut(T) -> O,
  {
    let data = self.param_iter().map(cb).collect();
    Tensor::new(&self.shape.dims, data)
  }

  /// Overwrite this tensor's elements in place, combining them
  /// with the (broadcasted) elements of `other`.

  pub fn op_assign(&self, other: &Self, cb: impl Fn(&mut T, T)) {
    let other = other.broadcast(&self.shape);
    assert!(other.shape.dims == self.shape.dims,
      "Could not assign {} tensor to {} tensor", other.shape, self.shape);
    // Avoid clashing borrow when tensors share storage
    let other = if self.shared_with(&other) { other.detach() } else { other };
    let mut data = self.data.borrow_mut();
    for (i, value) in self.shape.iter().zip(other.param_iter()) {
      cb(&mut data[i], value);
    }
  }

  pub fn assign(&self, other: &Self) {
    self.op_assign(other, |a, b| *a = b );
  }

  pub fn refill(&self, filler: T) {
    let mut data = self.data.borrow_mut();
    for i in self.shape.iter() {
      data[i] = filler;
    }
  }

  pub fn param_iter(&self) -> TensorIterator<T> {
    TensorIterator::new(self)
  }

  /// View of `len` consecutive entries along the first dimension.

  pub fn narrow(&self, start: usize, len: usize) -> Self {
    let shape = self.shape.narrow(start, len);
    let data = self.data.clone();
    Self { shape, data }
  }

  /// Split the first dimension into views of at most `size` entries.

  pub fn chunks(&self, size: usize) -> Vec<Tensor<T>> {
    assert!(size > 0, "Chunk size must be positive");
    assert!(self.rank() > 0, "Cannot split a scalar into chunks");
    let n = self.shape.dims[0];
    (0..n)
      .step_by(size)
      .map(|start| self.narrow(start, size.min(n - start)) )
      .collect()
  }
}

impl<T: Numeric> Tensor<T> {
  pub fn zeros(shape: &[usize]) -> Self {
    Self::fill(shape, T::zero())
  }

  pub fn arrange(shape: &[usize], start: T, step: T) -> Self {
    Self::new(shape, (0..shape.iter().product())
      .map(|i| T::from(i).unwrap() * step + start )
      .collect())
  }

  pub fn add(&self, rhs: &Self) -> Self {
    self.zip(rhs, |(a, b)| a + b )
  }

  pub fn sub(&self, rhs: &Self) -> Self {
    self.zip(rhs, |(a, b)| a - b )
  }

  pub fn mul(&self, rhs: &Self) -> Self {
    self.zip(rhs, |(a, b)| a * b )
  }

  pub fn div(&self, rhs: &Self) -> Self {
    self.zip(rhs, |(a, b)| a / b )
  }

  /// Sum over a single dimension, keeping it with a size of one.

  pub fn sum_over(&self, dim: isize) -> Self {
    let dim = negative_index(dim, self.rank(), false);
    let this = self.contiguous();
    let outer: usize = this.shape.dims[..dim].iter().product();
    let inner: usize = this.shape.dims[dim + 1..].iter().product();
    let n = this.shape.dims[dim];
    let raw = this.raw();
    let offset = this.shape.offset;
    let data = (0..outer)
      .cartesian_product(0..inner)
      .map(|(o, i)| (0..n)
        .map(|k| raw[offset + (o * n + k) * inner + i] )
        .fold(T::zero(), |acc, a| acc + a )
      )
      .collect();
    let mut dims = this.shape.dims.clone();
    dims[dim] = 1;
    Tensor::new(&dims, data)
  }
}

impl<T: Real> Tensor<T> {
  /// Standard normal values from a thread-local generator.

  pub fn randn(shape: &[usize]) -> Self {
    Self::randn_with(shape, &mut rand::thread_rng())
  }

  /// Standard normal values drawn from `rng`.
  ///
  /// Generators seeded identically produce identical tensors.

  pub fn randn_with<R: Rng + ?Sized>(shape: &[usize], rng: &mut R) -> Self {
    let len = shape.iter().product();
    let mut data = Vec::with_capacity(len + 1);
    while data.len() < len {
      let (r1, r2): (T, T) = randn(rng);
      data.push(r1);
      data.push(r2);
    }
    data.truncate(len);
    Self::new(shape, data)
  }

  pub fn trained(&self) -> Variable<T> {
    Variable::from_tensor(self.clone(), true)
  }

  pub fn tracked(&self) -> Variable<T> {
    Variable::from_tensor(self.clone(), false)
  }

  pub fn log(&self) -> Self {
    self.vectorize(|a| a.ln() )
  }
}

impl<T: Inner> std::fmt::Display for Tensor<T> {
  fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
    let data: Vec<T> = self.param_iter().collect();
    write!(f, "Tensor{:?} {}", self.shape.dims, nested(&self.shape.dims, &data))
  }
}

fn nested<T: std::fmt::Debug>(dims: &[usize], data: &[T]) -> String {
  match dims {
    [] => format!("{:?}", data[0]),
    [_] => format!("[{}]", data.iter().map(|a| format!("{:?}", a) ).join(", ")),
    [n, rest @ ..] => {
      let step = rest.iter().product::<usize>();
      let rows = (0..*n).map(|i| nested(rest, &data[i * step..(i + 1) * step]) );
      format!("[{}]", rows.format(", "))
    },
  }
}


pub struct TensorIterator<'a, T: Inner> {
  data: Ref<'a, Vec<T>>,
  shape_iter: Box<dyn Iterator<Item=usize> + 'a>,
}

impl<'a, T: Inner> TensorIterator<'a, T> {
  fn new(tensor: &'a Tensor<T>) -> Self {
    Self {
      data: tensor.data.borrow(),
      shape_iter: tensor.shape.iter(),
    }
  }
}

impl<T: Inner> Iterator for TensorIterator<'_, T> {
  type Item = T;

  fn next(&mut self) -> Option<Self::Item> {
    self.shape_iter.next().map(|i| self.data[i] )
  }
}
