//! HTTP API handlers for myagara-ic

pub mod health;
pub mod images;

pub use health::health_routes;
pub use images::image_routes;
