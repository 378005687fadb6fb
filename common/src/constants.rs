//! Shared constants

/// Public Azure cloud Resource Manager endpoint
pub const ARM_API_URL: &str = "https://management.azure.com";

/// `api-version` query value for every `Microsoft.Sql` request
pub const SQL_API_VERSION: &str = "2021-11-01";

/// Provider namespace of SQL servers and their child resources
pub const SQL_PROVIDER: &str = "Microsoft.Sql";

/// Storage limits are given in megabytes on the command line but sent in bytes.
pub const BYTES_PER_MEGABYTE: i64 = 1_048_576;
/// Largest storage limit whose byte count still fits in an `i64`
pub const MAX_STORAGE_MB: i64 = i64::MAX / BYTES_PER_MEGABYTE;

/// Appended to the edition to form the sku name of a DTU based pool, e.g. `StandardPool`.
pub const DTU_POOL_SKU_POSTFIX: &str = "Pool";

/// Resource Manager tag limits
pub const MAX_TAG_COUNT: usize = 50;
pub const MAX_TAG_KEY_LENGTH: usize = 512;
pub const MAX_TAG_VALUE_LENGTH: usize = 256;
pub const FORBIDDEN_TAG_KEY_CHARS: &[char] = &['<', '>', '%', '&', '\\', '?', '/'];

/// Poll interval used when a long running operation does not send `Retry-After`
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 10;
/// Give up waiting on a long running operation after this long
pub const MAX_OPERATION_WAIT_SECS: u64 = 60 * 60;
