pub mod emitters;
pub mod http;
pub mod maintainer;

pub use http::{create_router, AppState};
