pub mod remote_store_adapter;

pub use remote_store_adapter::{FtpConnector, FtpRemoteStore};
