//! Fixed limits and reserved names of the GOIF runtime.

/// Call stack depth limit, unless the unsafe-jump (`-j`) flag is set.
pub const CALL_STACK_LIMIT: usize = 255;

/// File id of the root source file.
pub const FID_MAIN: u32 = 1;

/// File id of the standard library, always loaded.
pub const FID_STD: u32 = 2;

/// Display name used for the root file before a real one is known (REPL mode).
pub const MAIN_DISPLAY_NAME: &str = "MAIN";

pub const STD_DISPLAY_NAME: &str = "std.goif";

/// Label every file implicitly has if it didn't declare one.
pub const IMPLICIT_MAIN_LABEL: &str = "MAIN";

/// The reserved exception name that is always fatal.
pub const RESERVED_FATAL_EXCEPTION: &str = "ERROR";

/// The catchable exception raised by div/mod-by-zero and out-of-range indexing.
pub const OP_FAIL: &str = "OP_FAIL";

pub const STDIN: &str = "STDIN";
pub const STDOUT: &str = "STDOUT";
pub const STDERR: &str = "STDERR";

pub const MAIN_ALIAS: &str = "MAIN";
pub const STD_ALIAS: &str = "STD";
