//! External service interactions
//!
//! - `graphql` - transport, response cache and background execution
//! - `epochs` - the epoch list/count queries on top of it

pub mod epochs;
pub mod graphql;

pub use epochs::{count_request, decode_count, decode_epochs, list_request, EpochCount};
pub use graphql::{CacheKey, HttpTransport, QueryClient, QueryError, QueryState};
