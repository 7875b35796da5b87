//! Business logic services.
//!
//! - [`registration`] - In-process registration and the user store
//! - [`registrar`] - The `register` capability (in-process or remote)
//! - [`import`] - Bulk importer over decoded spreadsheet rows
//! - [`report`] - Report generation, artifact naming and saving

pub mod import;
pub mod registrar;
pub mod registration;
pub mod report;

pub use import::{BulkImporter, BulkResult, RowOutcome, RowPlan, SkipReason};
pub use registrar::{Registrar, RegistrarError, Registrars, RemoteRegistrar};
pub use registration::{RegistrationService, UserStore};
pub use report::{Report, ReportRow, generate_report, save_report};
