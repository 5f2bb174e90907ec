use crate::{
  internal::*,
  shape::Shape,
  tensor::Tensor,
  scalar::{ Inner, Numeric, Signed, Real },
  ops::{ Cops, BaseOps, NumericOps, RealOps },
};


impl<T: Inner> BaseOps<T> for Tensor<T> {
  fn scalar(item: T) -> Self {
    Self::new(&[], vec![item])
  }

  fn shape(&self) -> &Shape {
    &self.shape
  }

  fn broadcast(&self, shape: &Shape) -> Self {
    Self {
      shape: self.shape.broadcast(shape),
      data: self.data.clone(),
    }
  }

  fn reshape(&self, dims: &[usize]) -> Self {
    let this = self.contiguous();
    let shape = this.shape.view(dims);
    Self { shape, data: this.data }
  }

  fn transpose(&self, dim1: isize, dim2: isize) -> Self {
    let shape = self.shape.transpose(dim1, dim2);
    let data = self.data.clone();
    Self { shape, data }
  }
}

impl<T: Numeric> NumericOps<T> for Tensor<T> {
  fn sum(&self, dim: isize) -> Self {
    let dim = negative_index(dim, self.rank(), false);
    let this = self.contiguous();
    let dims = &this.shape.dims[..dim];
    let inner: usize = this.shape.dims[dim..].iter().product();
    let outer: usize = dims.iter().product();
    let raw = this.raw();
    let offset = this.shape.offset;
    let data = (0..outer)
      .map(|o| raw[offset + o * inner..offset + (o + 1) * inner].iter().copied().sum() )
      .collect();
    Self::new(dims, data)
  }

  fn mm(&self, rhs: &Self) -> Self {
    assert!(self.rank() == 2 && rhs.rank() == 2,
      "Matrix multiplication expects two matrices, got {} & {}", self.shape, rhs.shape);
    let data = self.matmul(rhs);
    Self::new(&[self.shape[0], rhs.shape[1]], data)
  }
}

impl<T: Real> RealOps<T> for Tensor<T> {
  fn pow(&self, rhs: &Self) -> Self {
    self.zip(rhs, |(a, b)| a.powf(b) )
  }
}

impl<T: Signed> std::ops::Neg for &Tensor<T> {
  type Output = Tensor<T>;

  fn neg(self) -> Self::Output {
    self * (-T::one())
  }
}

impl<T: Signed> std::ops::Neg for Tensor<T> {
  type Output = Tensor<T>;

  fn neg(self) -> Self::Output {
    -&self
  }
}

macro_rules! add_operator {
  ($trait:ident, $meth:ident) => {
    impl<T: Numeric> std::ops::$trait for &Tensor<T> { // &tensor * &other
      type Output = Tensor<T>;

      fn $meth(self, rhs: Self) -> Tensor<T> {
        Tensor::$meth(self, rhs)
      }
    }

    impl<T: Numeric> std::ops::$trait for Tensor<T> { // tensor * other
      type Output = Tensor<T>;

      fn $meth(self, rhs: Self) -> Tensor<T> {
        Tensor::$meth(&self, &rhs)
      }
    }

    impl<T: Numeric> std::ops::$trait<Tensor<T>> for &Tensor<T> { // &tensor * other
      type Output = Tensor<T>;

      fn $meth(self, rhs: Tensor<T>) -> Tensor<T> {
        Tensor::$meth(self, &rhs)
      }
    }

    impl<T: Numeric> std::ops::$trait<&Tensor<T>> for Tensor<T> { // tensor * &other
      type Output = Tensor<T>;

      fn $meth(self, rhs: &Tensor<T>) -> Tensor<T> {
        Tensor::$meth(&self, rhs)
      }
    }

    impl<T: Numeric> std::ops::$trait<T> for &Tensor<T> { // &tensor * T
      type Output = Tensor<T>;

      fn $meth(self, rhs: T) -> Tensor<T> {
        Tensor::$meth(self, &Tensor::scalar(rhs))
      }
    }

    impl<T: Numeric> std::ops::$trait<T> for Tensor<T> { // tensor * T
      type Output = Tensor<T>;

      fn $meth(self, rhs: T) -> Tensor<T> {
        Tensor::$meth(&self, &Tensor::scalar(rhs))
      }
    }
  };
}

add_operator!(Add, add);
add_operator!(Sub, sub);
add_operator!(Mul, mul);
add_operator!(Div, div);


#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn sum() {
    let a = Tensor::new(&[3,2], vec![1, 2, 3, 4, 5, 6]);
    assert_eq!(a.sum(0), Tensor::new(&[], vec![21]));
    assert_eq!(a.sum(-1), Tensor::new(&[3], vec![3, 7, 11]));
  }

  #[test]
  fn sum_transposed() {
    let a = Tensor::new(&[2,2], vec![1, 2, 3, 4]).transpose(0, 1);
    assert_eq!(a.sum(-1), Tensor::vec(&[4, 6]));
  }

  #[test]
  fn reshape() {
    let a = Tensor::arrange(&[2,3], 1, 1);
    assert_eq!(a.reshape(&[3,2]), Tensor::new(&[3,2], vec![1, 2, 3, 4, 5, 6]));
    assert_eq!(a.transpose(0, 1).reshape(&[6]), Tensor::vec(&[1, 4, 2, 5, 3, 6]));
  }

  #[test]
  fn scalar_arithmetic() {
    let a = Tensor::vec(&[1.0, 2.0]);
    assert_eq!(&a * 2.0 - 1.0, Tensor::vec(&[1.0, 3.0]));
    assert_eq!(-a, Tensor::vec(&[-1.0, -2.0]));
  }
}
