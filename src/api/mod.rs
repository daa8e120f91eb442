//! API endpoint modules.

pub mod events;
pub mod health;
pub mod openapi;
pub mod projects;
pub mod triggers;
pub mod websocket;

pub use events::configure_routes as configure_event_routes;
pub use health::configure_health_routes;
pub use openapi::ApiDoc;
pub use projects::configure_routes as configure_project_routes;
pub use triggers::configure_routes as configure_trigger_routes;
pub use websocket::configure_routes as configure_websocket_routes;
