//! Process exit codes for CLI operations

/// General error - unspecified failure or invalid input
pub const ERROR: i32 = 1;

/// Template error - template compilation or rendering failed
pub const TEMPLATE_ERROR: i32 = 3;

/// Document error - YAML parse failure, non-mapping document, bad index or path
pub const DOCUMENT_ERROR: i32 = 4;

/// IO error - file not found, permission denied, etc.
pub const IO_ERROR: i32 = 5;
