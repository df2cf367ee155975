//! ISP Admin Client: `reqwest` implementations of the remote
//! collaborators and a file-backed session store.

pub mod client;
pub mod config;
pub mod error;
pub mod storage;

pub use client::HttpBackend;
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use storage::FileSessionPersistence;
