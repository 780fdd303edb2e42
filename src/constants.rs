//! Centralized constants for permissions, paths, and record schemas.

/// Default state directory shared by the CLI and the daemon.
pub const DEFAULT_ROOT: &str = "/var/lib/prql";

/// Environment variable overriding the state directory.
pub const ROOT_ENV: &str = "PRQL_ROOT";

/// Environment variable holding the tracing filter directive.
pub const LOG_ENV: &str = "PRQL_LOG";

/// Permission mode for the state directory.
pub const ROOT_DIR_MODE: u32 = 0o700;

/// Permission mode for pool files and the config file.
pub const POOL_FILE_MODE: u32 = 0o600;

/// Field delimiter used by every pool file.
pub const ENTRY_DELIMITER: char = ':';

/// Length of a token identifier in hex characters.
pub const TOKEN_ID_LEN: usize = 32;

/// Random bytes mixed into the token seed.
pub const TOKEN_NONCE_LEN: usize = 16;

/// How often token generation retries after hitting an existing ID.
pub const TOKEN_GENERATION_ATTEMPTS: usize = 8;

/// Maximum secret size in bytes (64 KiB).
pub const MAX_SECRET_SIZE: usize = 65_536;

/// Default database port for host entries.
pub const DEFAULT_DB_PORT: u16 = 5432;

/// Key used by the reversible password obfuscation when none is configured.
pub const DEFAULT_OBFUSCATION_KEY: &str = "prql-insecure-obfuscation";
