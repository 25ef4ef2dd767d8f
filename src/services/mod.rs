// Service exports
pub mod dataset;
pub mod model_store;
pub mod rates;
pub mod session;

pub use dataset::{Dataset, DatasetError};
pub use model_store::{LoadedModel, ModelArtifact, ModelLoadError};
pub use rates::{RatesClient, RatesError, RatesProvider};
pub use session::{CycleTicket, DashboardSession, SessionStore, SharedSession};
