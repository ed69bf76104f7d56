//! Standard exit codes for CLI operations
//!
//! These exit codes follow Unix conventions and sysexits.h where applicable.

/// General error - unspecified failure
pub const ERROR: i32 = 1;

/// Configuration error - invalid warpack.yaml, mapping, pattern or filter file
pub const CONFIG_ERROR: i32 = 2;

/// Descriptor error - a configured deployment descriptor is missing
pub const DESCRIPTOR_ERROR: i32 = 3;

/// IO error - copy or extraction failed
pub const IO_ERROR: i32 = 5;

/// Usage error - invalid arguments or options (following sysexits.h convention)
pub const USAGE_ERROR: i32 = 64;
