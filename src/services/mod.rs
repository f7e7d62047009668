pub mod cache;
pub mod data_fetcher;
pub mod normalizer;
pub mod predictor;

pub use data_fetcher::*;
pub use normalizer::*;
pub use predictor::*;
