mod router;
mod service;
pub mod validation;

pub use router::engine_router;
pub use service::*;
