//! Clients for the managed backend: access-token verification and chart
//! object storage. Row persistence lives in `db`.

pub mod auth;
pub mod storage;

pub use auth::{AccessTokenVerifier, Claims, TokenError};
pub use storage::{ChartStorage, StorageError};
