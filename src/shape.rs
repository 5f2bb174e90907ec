use serde::{ Serialize, Deserialize };

use crate::internal::*;


/// The shape of a [Tensor](crate::Tensor).
///
/// Besides the dimensions, a shape stores the strides and offset used to
/// address its tensor's storage, which is what lets views like
/// transpositions and broadcasts share data with the tensor they came from.

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shape {
  pub dims: Vec<usize>,
  pub(crate) strides: Vec<isize>,
  pub(crate) offset: usize,
}

impl Shape {
  pub fn new(dims: &[usize]) -> Self {
    Self {
      dims: dims.to_vec(),
      strides: Self::make_strides(dims),
      offset: 0,
    }
  }

  fn make_strides(dims: &[usize]) -> Vec<isize> {
    if dims.is_empty() { return vec![] }
    let mut strides = vec![0; dims.len()];
    strides[dims.len() - 1] = 1;
    for i in (1..dims.len()).rev() {
      strides[i - 1] = dims[i] as isize * strides[i];
    }
    strides
  }

  pub fn size(&self) -> usize {
    self.dims.iter().product()
  }

  pub fn rank(&self) -> usize {
    self.dims.len()
  }

  pub fn contiguous(&self) -> bool {
    self.strides == Self::make_strides(&self.dims)
  }

  /// Storage indices of all elements in row-major order.

  pub fn iter(&self) -> Box<dyn Iterator<Item=usize> + '_> {
    if self.contiguous() {
      Box::new(self.offset..self.offset + self.size())
    } else {
      Box::new(ShapeIterator::new(self))
    }
  }

  /// Reinterpret a contiguous shape with new dimensions of equal size.

  pub fn view(&self, dims: &[usize]) -> Self {
    assert!(self.contiguous(), "Cannot view non-contiguous {}", self);
    assert_eq!(self.size(), dims.iter().product::<usize>(),
      "Cannot view {} as {:?}", self, dims);
    Self { dims: dims.to_vec(), strides: Self::make_strides(dims), offset: self.offset }
  }

  /// Restrict the first dimension to `len` entries starting at `start`.

  pub fn narrow(&self, start: usize, len: usize) -> Self {
    assert!(self.rank() > 0 && start + len <= self.dims[0],
      "Range {}..{} out of bounds for {}", start, start + len, self);
    let mut shape = self.clone();
    shape.dims[0] = len;
    shape.offset = (self.offset as isize + self.strides[0] * start as isize) as usize;
    shape
  }

  /// Stretch this shape to match `other`, following numpy's broadcasting rules.
  ///
  /// Stretched dimensions get a stride of zero, so no data needs to be copied.

  pub fn broadcast(&self, other: &Self) -> Self {
    let rank = self.rank().max(other.rank());
    let mut dims = vec![];
    let mut strides = vec![];
    self.dims.iter()
      .rev()
      .chain(std::iter::repeat(&1))
      .zip(other.dims.iter()
        .rev()
        .chain(std::iter::repeat(&1)))
      .inspect(|(&a, &b)|
        assert!(a == b || a == 1 || b == 1, "Could not broadcast {} & {}", self, other) )
      .take(rank)
      .zip(self.strides.iter()
        .rev()
        .chain(std::iter::repeat(&0)))
      .for_each(|((&dl, &dr), &stride)| {
        dims.push(if dl == 1 { dr } else { dl });
        strides.push(if dl == 1 && dr != 1 { 0 } else { stride });
      });
    dims.reverse();
    strides.reverse();
    Self { dims, strides, offset: self.offset }
  }

  pub fn transpose(&self, dim1: isize, dim2: isize) -> Self {
    let dim1 = negative_index(dim1, self.rank(), false);
    let dim2 = negative_index(dim2, self.rank(), false);
    let mut shape = self.clone();
    shape.dims.swap(dim1, dim2);
    shape.strides.swap(dim1, dim2);
    shape
  }
}

impl std::ops::Index<isize> for Shape {
  type Output = usize;

  fn index(&self, i: isize) -> &usize {
    let idx = negative_index(i, self.rank(), false);
    &self.dims[idx]
  }
}

impl std::fmt::Display for Shape {
  fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
    write!(f, "Shape{:?}", self.dims)
  }
}


/// Iterate through a non-contiguous [Shape]'s storage indices.

pub struct ShapeIterator<'a> {
  shape: &'a Shape,
  counter: Vec<usize>,
  idx: isize,
  finished: bool,
}

impl<'a> ShapeIterator<'a> {
  fn new(shape: &'a Shape) -> Self {
    Self {
      counter: vec![0; shape.rank()],
      idx: shape.offset as isize,
      finished: shape.size() == 0,
      shape,
    }
  }
}

impl Iterator for ShapeIterator<'_> {
  type Item = usize;

  fn next(&mut self) -> Option<Self::Item> {
    if self.finished { return None }
    let out = self.idx as usize;
    // Odometer: bump the last dimension, carry into the ones before it
    let mut carried = true;
    for d in (0..self.counter.len()).rev() {
      if self.counter[d] + 1 < self.shape.dims[d] {
        self.counter[d] += 1;
        self.idx += self.shape.strides[d];
        carried = false;
        break
      }
      self.idx -= (self.shape.dims[d] as isize - 1) * self.shape.strides[d];
      self.counter[d] = 0;
    }
    if carried { self.finished = true }
    Some(out)
  }
}
