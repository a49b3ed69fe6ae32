//! Request pipeline: wire types, transports, refresh coordination and the
//! typed endpoint client.

pub mod api;
pub mod client;
pub mod error;
pub mod http;
pub mod refresh;
pub mod transport;
pub mod types;

pub use api::{API_PREFIX, DEFAULT_PAGE_LIMIT, DateRange};
pub use client::{ApiClient, layer};
#[cfg(not(target_arch = "wasm32"))]
pub use client::{NativeClient, connect};
#[cfg(feature = "hydrate")]
pub use client::{BrowserClient, connect_browser};
pub use error::ApiError;
pub use refresh::RefreshOnUnauthorized;
pub use transport::{ApiRequest, ApiResponse, Method, Transport, WithBearer};
