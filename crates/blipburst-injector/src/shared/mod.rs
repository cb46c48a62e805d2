pub mod handle;
pub mod service;

pub use handle::{InjectorRequest, SharedInjector};
