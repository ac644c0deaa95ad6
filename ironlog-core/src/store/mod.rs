pub mod db;
pub mod local;
pub mod remote;

pub use local::{LocalStore, StorageInfo};
pub use remote::{MockHandle, RemoteStore};
