// Bounded LRU store (store), async hydrating reader (reader), Markov
// access predictor (predictor), wired together by manager for a
// filesystem adapter to drive. The adapter itself is out of scope.

pub mod config;
pub mod error;
pub mod manager;
pub mod path;
pub mod predictor;
pub mod reader;
pub mod store;

pub use config::{Config, PredictorConfig};
pub use error::HydrateError;
pub use manager::{CacheManager, LookupResult};
pub use path::normalize;
pub use predictor::Predictor;
pub use reader::AsyncReader;
pub use store::{CacheBuffer, LruStore};
