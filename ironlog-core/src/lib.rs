pub mod analytics;
pub mod config;
pub mod error;
pub mod model;
pub mod service;
pub mod store;
pub mod sync;

pub use analytics::AnalyticsService;
pub use config::{DataServiceConfig, DataSource};
pub use error::{DataError, Result};
pub use service::DataService;
pub use store::{LocalStore, RemoteStore};
