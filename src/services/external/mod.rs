pub mod http;

pub use http::{ApiRequest, ApiTransport, HttpConfig};
