//! [`HttpClient`](super::HttpClient) wrappers that add credentials to requests.

mod api_key;

pub use api_key::ApiKey;
