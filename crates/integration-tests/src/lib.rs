//! Integration tests for Rollcall.
//!
//! Every test starts its own server on an ephemeral port with a fresh user
//! store and temporary import and report directories, then talks to it over
//! real HTTP.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p rollcall-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `registration` - `POST /api/registerUser` and the health check
//! - `bulk_import` - uploads, local imports and report downloads
//! - `remote_registrar` - bulk imports registering through another server

#![allow(clippy::missing_panics_doc, clippy::unwrap_used, clippy::expect_used)]

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use reqwest::Client;
use rollcall_server::config::ServerConfig;
use rollcall_server::services::UserStore;
use rollcall_server::state::AppState;
use rust_xlsxwriter::Workbook;
use tempfile::TempDir;
use url::Url;

/// A running server and the handles a test needs to inspect it.
pub struct TestServer {
    pub addr: SocketAddr,
    pub store: UserStore,
    pub client: Client,
    dir: TempDir,
}

impl TestServer {
    /// Start a server that registers bulk imports in-process.
    pub async fn spawn() -> Self {
        Self::spawn_with_registrar(None).await
    }

    /// Start a server whose bulk imports register through `registrar_url`.
    pub async fn spawn_with_registrar(registrar_url: Option<Url>) -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");

        let mut config = ServerConfig::from_lookup(|_| None).expect("Default config is valid");
        config.port = 0;
        config.import_dir = dir.path().join("imports");
        config.report_dir = dir.path().join("reports");
        config.registrar_url = registrar_url;

        let store = UserStore::new();
        let state = AppState::new(config.clone(), store.clone())
            .expect("Failed to initialize application state");

        let listener = tokio::net::TcpListener::bind(config.socket_addr())
            .await
            .expect("Failed to bind to address");
        let addr = listener.local_addr().expect("Listener has an address");

        tokio::spawn(async move {
            axum::serve(listener, rollcall_server::app(state))
                .await
                .expect("Server error");
        });

        Self {
            addr,
            store,
            client: Client::new(),
            dir,
        }
    }

    /// Absolute URL for `path` on this server.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    /// This server's `registerUser` endpoint.
    #[must_use]
    pub fn register_user_url(&self) -> Url {
        Url::parse(&self.url("/api/registerUser")).unwrap()
    }

    /// Directory `POST /register-bulk/local` reads from (created on demand).
    #[must_use]
    pub fn import_dir(&self) -> PathBuf {
        let path = self.dir.path().join("imports");
        std::fs::create_dir_all(&path).unwrap();
        path
    }

    /// Directory reports are saved to.
    #[must_use]
    pub fn report_dir(&self) -> PathBuf {
        self.dir.path().join("reports")
    }

    /// Upload `workbook` to `POST /register-bulk` in the `excelFile` field.
    pub async fn upload(&self, workbook: Vec<u8>) -> reqwest::Response {
        let part = reqwest::multipart::Part::bytes(workbook)
            .file_name("users.xlsx")
            .mime_str(rollcall_server::spreadsheet::XLSX_CONTENT_TYPE)
            .unwrap();
        let form = reqwest::multipart::Form::new().part("excelFile", part);

        self.client
            .post(self.url("/register-bulk"))
            .multipart(form)
            .send()
            .await
            .expect("Failed to upload workbook")
    }
}

/// Build an input workbook with a `Name, Email, Phone` header. Empty strings
/// leave the cell blank.
#[must_use]
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

/// Write an input workbook to `dir/name`.
pub fn write_input_workbook(dir: &Path, name: &str, rows: &[[&str; 3]]) {
    std::fs::write(dir.join(name), input_workbook(rows)).unwrap();
}

/// Decode a report and return its data rows (header checked and dropped).
#[must_use]
pub fn report_rows(bytes: &[u8]) -> Vec<Vec<String>> {
    let sheet = rollcall_server::spreadsheet::decode_sheet(bytes).unwrap();
    assert_eq!(sheet.name, "RegisteredUsers");

    let mut rows = sheet.rows.into_iter();
    assert_eq!(
        rows.next().unwrap(),
        ["name", "userId", "email", "phone"],
        "report header"
    );
    rows.map(|mut row| {
        row.resize(4, String::new());
        row
    })
    .collect()
}
