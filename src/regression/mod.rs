//! Single-feature linear regression trained by hand-written gradient descent.
//!
//! [Params] holds the trainable weight and bias, [model] and [mse_loss]
//! build the computation graph for one [Batch], and [train] runs the
//! epochs over whatever [DataLoader] the caller injects.

mod config;
mod data;
mod loss;
mod model;
mod params;
mod trainer;

pub use config::TrainConfig;
pub use data::{ Batch, DataLoader, BatchLoader };
pub use loss::mse_loss;
pub use model::model;
pub use params::Params;
pub use trainer::{ TrainState, TrainReport, EpochSummary, train, train_step };
