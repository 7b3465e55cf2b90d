pub mod config;
pub mod engine;
pub mod error;
pub mod expire;
pub mod export;
pub mod hasher;
pub mod model;
pub mod placer;
pub mod policy;
pub mod progress;
pub mod reconcile;
pub mod scanner;
pub mod selector;
pub mod stats;
pub mod store;

pub use config::AppConfig;
pub use engine::{PickEngine, RunResult};
pub use error::Error;
pub use export::ExportFormat;
pub use model::FileRecord;
pub use policy::{ConflictPolicy, SelectionPolicy};
pub use progress::{ProgressReporter, SilentReporter};
pub use stats::DatabaseStatistics;
pub use store::HistoryStore;
