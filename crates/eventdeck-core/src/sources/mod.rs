//! Event sources.
//!
//! Two sources feed the loader, in fixed precedence:
//!
//! - `StaticSource`: the bundled JSON dataset
//! - `RemoteSource`: the live listing page, reached through an ordered list
//!   of proxies and scraped for structured-data blocks (`jsonld`)
//!
//! Both go through the `HttpFetch` primitive so the network can be swapped
//! out in tests.

pub mod error;
pub mod http;
pub mod jsonld;
pub mod remote;
pub mod static_source;

pub use error::SourceError;
pub use http::{HttpClient, HttpFetch, HttpResponse};
pub use remote::{ProxyTemplate, RemoteSource, DEFAULT_REMOTE_URL};
pub use static_source::StaticSource;
