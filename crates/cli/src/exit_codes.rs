//! CLI Exit Code Registry
//!
//! Single source of truth for `tablesort` exit codes. Scripts rely on them.
//!
//! | Code | Meaning                                         |
//! |------|-------------------------------------------------|
//! | 0    | Success                                         |
//! | 2    | Usage error (bad column reference, bad bounds)  |
//! | 3    | I/O error (unreadable input, broken stdout)     |
//! | 4    | Parse error (malformed CSV, table too small)    |
//! | 5    | Configuration error (settings file)             |

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// Usage error - bad arguments that clap could not catch.
pub const EXIT_USAGE: u8 = 2;

/// Input could not be read or output could not be written.
pub const EXIT_IO: u8 = 3;

/// Input was read but is not a usable table.
pub const EXIT_PARSE: u8 = 4;

/// Settings file unreadable or invalid.
pub const EXIT_CONFIG: u8 = 5;

