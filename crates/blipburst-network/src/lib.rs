pub mod http;
pub mod identity;

pub use http::HttpCaller;
pub use identity::CallerIdentity;
