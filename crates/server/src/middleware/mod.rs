//! HTTP middleware stack.
//!
//! See [`crate::app`] for the order the layers are applied in.

pub mod request_id;

pub use request_id::{REQUEST_ID_HEADER, request_id_middleware};

use tower_http::cors::CorsLayer;

/// CORS policy: any origin, method and header. Browser front-ends on other
/// origins upload directly and read the download headers.
#[must_use]
pub fn cors_layer() -> CorsLayer {
    CorsLayer::permissive()
}
