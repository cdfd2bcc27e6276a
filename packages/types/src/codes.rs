//! Error codes documented by the etcd v2 API.

/// Key not found.
pub const KEY_NOT_FOUND: i32 = 100;

/// Compare failed.
pub const TEST_FAILED: i32 = 101;

/// Not a file.
pub const NOT_FILE: i32 = 102;

/// Not a directory.
pub const NOT_DIR: i32 = 104;

/// Key already exists.
pub const NODE_EXIST: i32 = 105;

/// Root is read only.
pub const ROOT_RONLY: i32 = 107;

/// Directory not empty.
pub const DIR_NOT_EMPTY: i32 = 108;
