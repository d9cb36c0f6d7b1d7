//! Platform probe - native integer width
//!
//! Design: Decided once per process, then passed around as a plain value.
//! The encoder and resolver never consult global state; only
//! [`Platform::current`] caches the probe for callers that want the
//! process-wide answer.

use crate::interop::DataType;
use crate::logging::debug;
use num_traits::{NumCast, PrimInt};
use once_cell::sync::OnceCell;

static PLATFORM: OnceCell<Platform> = OnceCell::new();

/// Whether `T` can represent `2^31`, i.e. does not overflow when one is
/// added to the largest 32-bit signed value.
#[inline]
pub fn wider_than_i32<T: PrimInt>() -> bool {
    let Some(max32) = <T as NumCast>::from(i32::MAX) else {
        return false;
    };
    max32.checked_add(&T::one()).is_some()
}

/// Result of the integer width probe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Platform {
    int_type: DataType,
}

impl Platform {
    /// Probe the host's native word (`isize`)
    pub fn detect() -> Self {
        Self::probe::<isize>()
    }

    /// Probe an arbitrary integer type as if it were the native word
    pub fn probe<T: PrimInt>() -> Self {
        let int_type = if wider_than_i32::<T>() {
            DataType::Int64
        } else {
            DataType::Int32
        };
        Self { int_type }
    }

    /// Process-wide probe result, computed on first use and never changed
    pub fn current() -> Self {
        *PLATFORM.get_or_init(|| {
            let platform = Self::detect();
            debug!(
                event = "platform_probe",
                int_type = ?platform.int_type,
                "native integer width resolved"
            );
            platform
        })
    }

    /// Boundary tag used for the platform integer
    #[inline]
    pub const fn int_type(&self) -> DataType {
        self.int_type
    }

    /// Whether the platform integer crosses as a 64-bit value
    #[inline]
    pub fn int_is_64(&self) -> bool {
        self.int_type == DataType::Int64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wider_than_i32() {
        assert!(wider_than_i32::<i64>());
        assert!(wider_than_i32::<i128>());
        assert!(wider_than_i32::<u32>());
        assert!(!wider_than_i32::<i32>());
        assert!(!wider_than_i32::<i16>());
    }

    #[test]
    fn test_probe_selects_tag() {
        assert_eq!(Platform::probe::<i64>().int_type(), DataType::Int64);
        assert_eq!(Platform::probe::<i32>().int_type(), DataType::Int32);
    }

    #[test]
    fn test_detect_matches_pointer_width() {
        let expected = if cfg!(target_pointer_width = "64") {
            DataType::Int64
        } else {
            DataType::Int32
        };
        assert_eq!(Platform::detect().int_type(), expected);
    }

    #[test]
    fn test_current_is_stable() {
        let first = Platform::current();
        for _ in 0..4 {
            assert_eq!(Platform::current(), first);
        }
        assert_eq!(first, Platform::detect());
    }
}
