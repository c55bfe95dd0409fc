//! # Resource Limits
//!
//! Fixed budgets that every schema is checked against, plus the size
//! estimates used where a true size cannot be introspected.

/// Maximum number of keys that may be flagged `hot_key: true`.
pub const MAX_HOT_KEYS: usize = 32;

/// Maximum size in bytes of a single hot key value.
///
/// Sized for a 64-axis `array<double, 64>` (64 × 8 bytes).
pub const MAX_HOT_KEY_SIZE_BYTES: u64 = 512;

/// The only MAJOR schema version the toolchain is tested against.
/// Other majors validate with a warning.
pub const SUPPORTED_MAJOR_VERSION: u64 = 1;

/// Budgeted size of a `string` value. Strings are variable length; the data
/// store caps them at this many bytes.
pub const STRING_SIZE_ESTIMATE: u64 = 256;

/// Size assumed for a custom type whose definition does not declare `size`.
/// Struct and enum layouts are not introspected, so this is an approximation.
pub const CUSTOM_TYPE_SIZE_ESTIMATE: u64 = 8;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hot_key_ceiling_fits_64_doubles() {
        assert_eq!(64 * 8, MAX_HOT_KEY_SIZE_BYTES);
    }

    #[test]
    fn string_estimate_fits_in_hot_key() {
        assert!(STRING_SIZE_ESTIMATE <= MAX_HOT_KEY_SIZE_BYTES);
    }
}
