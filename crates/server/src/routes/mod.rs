//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Health check
//!
//! # Registration
//! POST /api/registerUser       - Register one user (JSON)
//!
//! # Bulk import
//! POST /register-bulk          - Upload a workbook (multipart), download the report
//! POST /register-bulk/local    - Import a workbook from the import directory
//!
//! # Reports
//! GET  /reports/{file_name}    - Download a saved report
//! ```

pub mod bulk;
pub mod reports;
pub mod users;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the router for every application route.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/registerUser", post(users::register_user))
        .route("/register-bulk", post(bulk::upload))
        .route("/register-bulk/local", post(bulk::local))
        .route("/reports/{file_name}", get(reports::download))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod test_support {
    use std::path::Path;

    use axum::Router;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, Response};
    use rust_xlsxwriter::Workbook;
    use tower::ServiceExt;

    use crate::config::ServerConfig;
    use crate::services::UserStore;
    use crate::state::AppState;

    /// Build an app whose import and report directories live under `root`.
    pub fn app(root: &Path) -> (Router, UserStore) {
        let mut config = ServerConfig::from_lookup(|_| None).unwrap();
        config.import_dir = root.join("imports");
        config.report_dir = root.join("reports");
        let store = UserStore::new();
        let state = AppState::new(config, store.clone()).unwrap();
        (crate::app(state), store)
    }

    pub async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
        app.clone().oneshot(request).await.unwrap()
    }

    pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
        to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
            .to_vec()
    }

    pub async fn body_json(response: Response<Body>) -> serde_json::Value {
        serde_json::from_slice(&body_bytes(response).await).unwrap()
    }

    /// An input workbook with a `Name, Email, Phone` header.
    pub fn input_workbook(rows: &[[&str; 3]]) -> Vec<u8> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        for (col, header) in (0u16..).zip(["Name", "Email", "Phone"]) {
            worksheet.write_string(0, col, header).unwrap();
        }
        for (row_num, row) in (1u32..).zip(rows) {
            for (col, cell) in (0u16..).zip(row) {
                if !cell.is_empty() {
                    worksheet.write_string(row_num, col, *cell).unwrap();
                }
            }
        }
        workbook.save_to_buffer().unwrap()
    }
}
