use crate::{
  tensor::Tensor,
  scalar::Numeric,
  ops::Cops,
};


impl<T: Numeric> Cops<T> for Tensor<T> {
  fn matmul(&self, rhs: &Self) -> Vec<T> {
    let lhs = self.contiguous();
    let rhs = rhs.contiguous();

    let rows_l = lhs.shape[-2];
    let rows_r = rhs.shape[-2];
    let cols_l = lhs.shape[-1];
    let cols_r = rhs.shape[-1];
    assert_eq!(cols_l, rows_r,
      "Cannot multiply {} by {} matrix", lhs.shape, rhs.shape);

    let data_l = lhs.data.borrow();
    let data_r = rhs.data.borrow();
    let offset_l = lhs.shape.offset;
    let offset_r = rhs.shape.offset;

    let mut data = vec![T::zero(); rows_l * cols_r];
    for i in 0..rows_l {
      for j in 0..cols_r {
        for k in 0..rows_r {
          data[i * cols_r + j] +=
            data_l[offset_l + i * cols_l + k] *
            data_r[offset_r + k * cols_r + j];
        }
      }
    }

    data
  }
}


#[cfg(test)]
mod tests {
  use super::*;
  use crate::ops::{ BaseOps, NumericOps };

  #[test]
  fn matmul() {
    let x = Tensor::new(&[2,3], vec![1, 2, 3, 4, 5, 6]);
    let y = Tensor::new(&[3,2], vec![1, 2, 3, 4, 5, 6]);
    assert_eq!(x.mm(&y), Tensor::new(&[2,2], vec![22, 28, 49, 64]));
  }

  #[test]
  fn matmul_column() {
    let x = Tensor::new(&[2,3], vec![1, 2, 3, 4, 5, 6]);
    let y = Tensor::new(&[3,1], vec![1, 2, 3]);
    assert_eq!(x.mm(&y), Tensor::new(&[2,1], vec![14, 32]));
  }

  #[test]
  fn matmul_transposed() {
    let x = Tensor::new(&[3,1], vec![1, 2, 3]);
    assert_eq!(x.transpose(0, 1).mm(&x), Tensor::new(&[1,1], vec![14]));
  }

  #[test]
  #[should_panic]
  fn matmul_mismatch() {
    let x = Tensor::new(&[2,3], vec![1, 2, 3, 4, 5, 6]);
    x.mm(&x);
  }
}
