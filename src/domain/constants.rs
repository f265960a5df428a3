//! Domain constants for digest and curve widths.
//! Keep this intentionally small; only broadly reused literals should live here.

/// SHA-256 digest length in bytes.
pub const SHA256_DIGEST_LEN: usize = 32;

/// Byte length of the P-256 curve order (one half of a raw signature).
pub const P256_ORDER_LEN: usize = 32;

/// Byte length of the P-384 curve order (one half of a raw signature).
pub const P384_ORDER_LEN: usize = 48;

/// Conventional name of the personal certificate store.
pub const DEFAULT_STORE_NAME: &str = "MY";
