use std::cell::Cell;

thread_local! {
  static GRAD_ENABLED: Cell<bool> = Cell::new(true);
}


/// Whether operations on [Variable](crate::Variable)s are currently
/// being recorded into computation graphs on this thread.

pub fn is_grad_enabled() -> bool {
  GRAD_ENABLED.with(|enabled| enabled.get() )
}


/// Disables gradient tracking until dropped.
///
/// Guards nest: dropping one restores whatever mode was active
/// when it was created.

#[must_use = "gradient tracking is re-enabled as soon as the guard is dropped"]
pub struct NoGradGuard {
  previous: bool,
}

impl NoGradGuard {
  pub fn new() -> Self {
    let previous = GRAD_ENABLED.with(|enabled| enabled.replace(false) );
    Self { previous }
  }
}

impl Default for NoGradGuard {
  fn default() -> Self {
    Self::new()
  }
}

impl Drop for NoGradGuard {
  fn drop(&mut self) {
    GRAD_ENABLED.with(|enabled| enabled.set(self.previous) );
  }
}


/// Run `cb` without recording any operations.
///
/// Values computed inside are plain constants, so in-place parameter
/// updates done here never end up in a computation graph.

pub fn no_grad<R>(cb: impl FnOnce() -> R) -> R {
  let _guard = NoGradGuard::new();
  cb()
}


#[cfg(test)]
mod tests {
  use super::*;
  use crate::Tensor;

  #[test]
  fn untracked_inside() {
    let w = Tensor::vec(&[2.0]).trained();
    let y = no_grad(|| &w * 3.0 );
    assert!(y.grad().is_none());
    assert_eq!(y.item(), 6.0);
    assert!(is_grad_enabled());
    assert!((&w * 3.0).grad().is_some());
  }

  #[test]
  fn guards_nest() {
    let outer = NoGradGuard::new();
    {
      let _inner = NoGradGuard::new();
      assert!(!is_grad_enabled());
    }
    assert!(!is_grad_enabled());
    drop(outer);
    assert!(is_grad_enabled());
  }
}
