pub mod api;
pub mod chat;
pub mod context;
pub mod routes;
pub mod telemetry;

pub use context::ServiceContext;
pub use routes::build_router;
