//! Linear regression by manual gradient descent.
//! Tiny. Few dependencies. CPU only.
//!
//! The crate carries just enough automatic differentiation to fit
//! `prediction = input × weight + bias` by hand, without any
//! higher-level layer or optimizer abstractions:
//!
//! - **Variables** — Tensors wrapped with [trained](Tensor::trained) record
//! the operations applied to them and receive gradients from
//! [backward](Variable::backward).
//!
//! - **Broadcasting** — Tensors with differing but compatible shapes get
//! broadcasted to matching dimensions automatically, and their gradients
//! are summed back to the original shape.
//!
//! - **No-grad scopes** — Parameter updates run inside [no_grad], so they
//! never become part of a computation graph.
//!
//! - **Regression** — The [regression] module puts it together: parameter
//! initialization, model, mean squared error and the training loop.
//!
//! # Examples
//!
//! Manual gradient descent on a single sample:
//! ```
//! use microgd::{ ops::*, Tensor, no_grad };
//!
//! // Create trainable variables from tensors
//! let mut weight = Tensor::vec(&[0.5]).trained();
//! let mut bias = Tensor::zeros(&[1]).trained();
//!
//! let learning_rate = 0.001;
//!
//! for _ in 0..10 {
//!   // Track training data for compute operations to be recorded
//!   let x = Tensor::new(&[1, 1], vec![-0.5]).tracked();
//!   let y = Tensor::new(&[1, 1], vec![5.0]).tracked();
//!
//!   // Compute loss
//!   let loss = (x.mm(&weight.reshape(&[1, 1])) + &bias - &y).sqr().mean(0);
//!
//!   // Compute gradients
//!   loss.backward().unwrap();
//!
//!   // Update parameters without recording the update, then reset gradients
//!   no_grad(|| {
//!     let change = weight.grad().unwrap() * learning_rate;
//!     weight -= change;
//!     let change = bias.grad().unwrap() * learning_rate;
//!     bias -= change;
//!     weight.zero_grad();
//!     bias.zero_grad();
//!   });
//! }
//! ```
//!
//! Check the `demos/` folder for a complete training run.

mod internal;
mod shape;
mod tensor;
mod variable;

pub mod error;
pub mod ops;
pub mod scalar;
pub mod regression;

pub use error::{ Error, Result };
pub use shape::Shape;
pub use tensor::Tensor;
pub use variable::{ Variable, UnaryOp, BinaryOp, NoGradGuard, no_grad, is_grad_enabled };
