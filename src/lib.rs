// SWIFT Code Registry - Core Library
// Exposes all modules for use in the CLI, the API server, and tests

pub mod codes;
pub mod config;
pub mod db;
pub mod logging;
pub mod operations;
pub mod parser;
pub mod schema;

#[cfg(feature = "server")]
pub mod api;

// Re-export commonly used types
pub use db::{
    NewSwiftCode, StoreError, StoreResult, SwiftCode,
    connect, count_codes, open_database, setup_database,
};
pub use operations::{CreateOutcome, DeleteOutcome};
pub use parser::{
    ImportError, ImportReport, ImportSummary, RowOutcome,
    import_file, parse_swift_csv, parse_swift_file, parse_swift_sheet, preload_if_present,
};
pub use schema::{
    CountrySwiftCodes, MessageResponse, SwiftCodeBranch, SwiftCodeDetail,
    ValidationError, ValidationResult,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
