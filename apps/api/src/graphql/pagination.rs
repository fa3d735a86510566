//! Page size handling for list fields

/// Page size when the client does not ask for one
pub const DEFAULT_SIZE: i32 = 10;

/// Largest page size forwarded upstream
pub const MAX_SIZE: i32 = 100;

/// Clamp a requested page size to `1..=MAX_SIZE`
#[inline]
pub fn clamp_size(size: Option<i32>) -> i32 {
    size.unwrap_or(DEFAULT_SIZE).clamp(1, MAX_SIZE)
}
