//! Standard exit codes (BSD sysexits.h compatible)

/// Unknown tree, node, option or topic on the command line
pub const USAGE: i32 = 64;

/// Knowledge base is structurally malformed
pub const DATAERR: i32 = 65;

/// Requested maintenance topic does not exist
pub const NOINPUT: i32 = 66;

/// Internal software error
pub const SOFTWARE: i32 = 70;

/// Input/output error
pub const IOERR: i32 = 74;

/// Configuration error
pub const CONFIG: i32 = 78;
