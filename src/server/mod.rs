pub mod builder;
pub mod correlation;
pub mod handler;
pub mod responses;

pub use builder::ServerBuilder;
pub use handler::ApiHandler;
