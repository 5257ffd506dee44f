//! Maps `Box<dyn Error>` from capability boundaries to typed `BinError`.
//!
//! The traits in `smartbin_traits` use boxed errors so any driver can plug in;
//! this module classifies them for logging and degraded-mode decisions, with an
//! optional feature-gated path for `smartbin_hardware::HwError` downcasting.

use crate::error::BinError;

/// Map a capability-boundary error to a typed `BinError`.
///
/// Attempts to downcast known hardware error types first, then falls back
/// to string-based heuristics.
pub fn map_hw_error(e: &(dyn std::error::Error + 'static)) -> BinError {
    #[cfg(feature = "hardware-errors")]
    {
        use smartbin_hardware::error::HwError;
        if let Some(hw) = e.downcast_ref::<HwError>() {
            return match hw {
                HwError::EchoTimeout | HwError::DataReadyTimeout => BinError::Timeout,
                HwError::RemoteUnavailable => BinError::Remote(hw.to_string()),
                other => BinError::HardwareFault(other.to_string()),
            };
        }
    }

    // Fallback: string-based detection
    let s = e.to_string();
    if s.to_lowercase().contains("timeout") {
        BinError::Timeout
    } else {
        BinError::Hardware(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn foreign_timeout_text_maps_to_timeout() {
        let e = std::io::Error::other("echo Timeout after 30ms");
        assert_eq!(map_hw_error(&e), BinError::Timeout);
    }

    #[test]
    fn unknown_error_keeps_message() {
        let e = std::io::Error::other("bus fault");
        assert_eq!(map_hw_error(&e), BinError::Hardware("bus fault".into()));
    }

    #[cfg(feature = "hardware-errors")]
    #[test]
    fn typed_hardware_errors_are_downcast() {
        use smartbin_hardware::error::HwError;
        assert_eq!(map_hw_error(&HwError::EchoTimeout), BinError::Timeout);
        assert!(matches!(
            map_hw_error(&HwError::RemoteUnavailable),
            BinError::Remote(_)
        ));
        assert!(matches!(
            map_hw_error(&HwError::Gpio("pin 4 busy".into())),
            BinError::HardwareFault(_)
        ));
    }
}
