//! Report generation: registered users back into tabular form.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use rand::Rng;
use rollcall_core::RegisteredUser;

use super::import::BulkResult;
use crate::storage::{FileStore, StorageError};

/// Prefix of every generated report file name.
pub const ARTIFACT_PREFIX: &str = "registered_users";

/// Names tried before a report save gives up on collisions.
pub const SAVE_ATTEMPTS: usize = 8;

/// One report row. Absent contact fields are empty strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRow {
    pub name: String,
    pub user_id: String,
    pub email: String,
    pub phone: String,
}

impl ReportRow {
    /// Cells in column order (see [`Report::HEADERS`]).
    #[must_use]
    pub fn cells(&self) -> [&str; 4] {
        [&self.name, &self.user_id, &self.email, &self.phone]
    }
}

impl From<&RegisteredUser> for ReportRow {
    fn from(user: &RegisteredUser) -> Self {
        Self {
            name: user.name.clone(),
            user_id: user.user_id.to_string(),
            email: user
                .email
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_default(),
            phone: user
                .phone
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_default(),
        }
    }
}

/// Tabular summary of one import run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    rows: Vec<ReportRow>,
}

impl Report {
    /// Column headers, in order.
    pub const HEADERS: [&'static str; 4] = ["name", "userId", "email", "phone"];

    /// Data rows, in the order the users were given.
    #[must_use]
    pub fn rows(&self) -> &[ReportRow] {
        &self.rows
    }

    /// Number of data rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` if the report has no data rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Build the report for `users`, one row per user, preserving order.
#[must_use]
pub fn generate_report(users: &[RegisteredUser]) -> Report {
    Report {
        rows: users.iter().map(ReportRow::from).collect(),
    }
}

/// Unique report file name: `registered_users_<YYYYMMDDTHHMMSS>_<4 hex>.xlsx`.
///
/// The random suffix keeps runs started within the same second apart; the
/// report store additionally refuses to overwrite an existing file.
pub fn artifact_name<R: Rng>(now: DateTime<Utc>, rng: &mut R) -> String {
    let suffix: u16 = rng.random();
    format!(
        "{ARTIFACT_PREFIX}_{}_{suffix:04x}.xlsx",
        now.format("%Y%m%dT%H%M%S")
    )
}

/// Save an encoded report under `result.output_artifact_name`.
///
/// If that name is already taken a fresh [`artifact_name`] is drawn and the
/// save retried, up to [`SAVE_ATTEMPTS`] names in total. `result` always ends
/// up carrying the name the report was written under.
///
/// # Errors
///
/// Returns `StorageError::AlreadyExists` if every name tried was taken, or
/// any other [`StorageError`] from the store.
pub async fn save_report(
    store: &FileStore,
    result: &mut BulkResult,
    bytes: &[u8],
) -> Result<PathBuf, StorageError> {
    save_report_with(store, result, bytes, || artifact_name(Utc::now(), &mut rand::rng())).await
}

async fn save_report_with<F>(
    store: &FileStore,
    result: &mut BulkResult,
    bytes: &[u8],
    mut next_name: F,
) -> Result<PathBuf, StorageError>
where
    F: FnMut() -> String,
{
    let mut attempt = 1;
    loop {
        match store.save(&result.output_artifact_name, bytes).await {
            Err(StorageError::AlreadyExists(taken)) if attempt < SAVE_ATTEMPTS => {
                attempt += 1;
                result.output_artifact_name = next_name();
                tracing::warn!(
                    taken = %taken,
                    retry_as = %result.output_artifact_name,
                    "Report name taken, retrying"
                );
            }
            outcome => return outcome,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use chrono::TimeZone;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use rollcall_core::{Email, Phone, RegistrationPayload, UserId};

    use super::*;

    fn user(name: &str, email: Option<&str>, phone: Option<&str>) -> RegisteredUser {
        let payload = RegistrationPayload::new(
            name,
            email.map(|e| Email::parse(e).unwrap()),
            phone.map(|p| Phone::parse(p).unwrap()),
        )
        .unwrap();
        RegisteredUser::new(UserId::generate(), payload)
    }

    #[test]
    fn test_report_rows_fill_missing_contacts_with_empty_strings() {
        let alice = user("Alice", Some("alice@example.com"), None);
        let carl = user("Carl", None, Some("+14155551234"));

        let report = generate_report(&[alice.clone(), carl.clone()]);

        assert_eq!(report.len(), 2);
        assert_eq!(
            report.rows()[0].cells(),
            ["Alice", alice.user_id.to_string().as_str(), "alice@example.com", ""]
        );
        assert_eq!(
            report.rows()[1].cells(),
            ["Carl", carl.user_id.to_string().as_str(), "", "+14155551234"]
        );
    }

    #[test]
    fn test_report_is_deterministic() {
        let users = vec![
            user("Alice", Some("alice@example.com"), None),
            user("Dana", Some("dana@example.com"), Some("5551234")),
        ];
        assert_eq!(generate_report(&users), generate_report(&users));
    }

    #[test]
    fn test_empty_report() {
        let report = generate_report(&[]);
        assert!(report.is_empty());
        assert_eq!(Report::HEADERS, ["name", "userId", "email", "phone"]);
    }

    #[test]
    fn test_artifact_name_format() {
        let now = Utc.with_ymd_and_hms(2024, 3, 7, 9, 5, 2).unwrap();
        let mut rng = StdRng::seed_from_u64(7);

        let name = artifact_name(now, &mut rng);

        assert!(name.starts_with("registered_users_20240307T090502_"));
        assert!(
            std::path::Path::new(&name)
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("xlsx"))
        );
        let suffix = name
            .trim_start_matches("registered_users_20240307T090502_")
            .trim_end_matches(".xlsx");
        assert_eq!(suffix.len(), 4);
        assert!(suffix.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    fn bulk_result(name: &str) -> BulkResult {
        BulkResult {
            registered_count: 0,
            registered_users: Vec::new(),
            output_artifact_name: name.to_string(),
        }
    }

    #[tokio::test]
    async fn test_save_report_redraws_taken_name() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        store.save("taken_1.xlsx", b"earlier run").await.unwrap();
        store.save("taken_2.xlsx", b"earlier run").await.unwrap();
        let mut fresh = ["taken_2.xlsx", "free.xlsx"].into_iter().map(String::from);
        let mut result = bulk_result("taken_1.xlsx");

        let saved_to = save_report_with(&store, &mut result, b"report", || fresh.next().unwrap())
            .await
            .unwrap();

        assert_eq!(result.output_artifact_name, "free.xlsx");
        assert_eq!(saved_to, dir.path().join("free.xlsx"));
        assert_eq!(store.load("free.xlsx").await.unwrap(), b"report");
        assert_eq!(store.load("taken_1.xlsx").await.unwrap(), b"earlier run");
        assert_eq!(store.load("taken_2.xlsx").await.unwrap(), b"earlier run");
    }

    #[tokio::test]
    async fn test_save_report_gives_up_after_attempts() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        store.save("taken.xlsx", b"earlier run").await.unwrap();
        let mut draws = 0;
        let mut result = bulk_result("taken.xlsx");

        let err = save_report_with(&store, &mut result, b"report", || {
            draws += 1;
            "taken.xlsx".to_string()
        })
        .await
        .unwrap_err();

        assert!(matches!(err, StorageError::AlreadyExists(_)));
        assert_eq!(draws, SAVE_ATTEMPTS - 1);
        assert_eq!(store.load("taken.xlsx").await.unwrap(), b"earlier run");
    }

    #[tokio::test]
    async fn test_save_report_keeps_free_name() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        let name = artifact_name(Utc::now(), &mut rand::rng());
        let mut result = bulk_result(&name);

        save_report(&store, &mut result, b"report").await.unwrap();

        assert_eq!(result.output_artifact_name, name);
        assert_eq!(store.load(&name).await.unwrap(), b"report");
    }

    #[test]
    fn test_artifact_names_differ_within_same_second() {
        let now = Utc::now();
        let mut rng = rand::rng();
        let names: std::collections::HashSet<_> =
            (0..20).map(|_| artifact_name(now, &mut rng)).collect();
        // 20 draws from 65536 suffixes; a handful of collisions would still pass.
        assert!(names.len() > 15);
    }
}
