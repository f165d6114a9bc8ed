//! Maps `Box<dyn Error>` from trait boundaries to typed `BinError`.
//!
//! The traits in `smartbin_traits` use `Box<dyn Error + Send + Sync>` so any
//! backend can plug in; this module converts those to our typed error enum,
//! with an optional feature-gated path for `smartbin_hardware::HwError`.

use crate::error::BinError;
use smartbin_traits::HwResult;

type BoxedHwError = Box<dyn std::error::Error + Send + Sync>;

/// Map a trait-boundary error to a typed `BinError`.
///
/// Attempts to downcast known hardware error types first, then falls back
/// to string-based heuristics.
pub fn map_hw_error(e: &(dyn std::error::Error + 'static)) -> BinError {
    #[cfg(feature = "hardware-errors")]
    {
        use smartbin_hardware::error::HwError;
        if let Some(hw) = e.downcast_ref::<HwError>() {
            return match hw {
                HwError::EchoTimeout => BinError::Timeout,
                HwError::Io(io) => BinError::Io(io.to_string()),
                other => BinError::Hardware(other.to_string()),
            };
        }
    }

    let s = e.to_string();
    if s.to_lowercase().contains("timeout") {
        BinError::Timeout
    } else {
        BinError::Hardware(s)
    }
}

/// Which output a failed command was addressed to.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Device {
    Actuator,
    Indicator,
    Buzzer,
}

/// Convert a collaborator result into a core result tagged with the device.
pub(crate) fn drive<T>(device: Device, r: HwResult<T>) -> crate::error::Result<T> {
    r.map_err(|e: BoxedHwError| {
        let detail = map_hw_error(&*e).to_string();
        let typed = match device {
            Device::Actuator => BinError::Actuator(detail),
            Device::Indicator => BinError::Indicator(detail),
            Device::Buzzer => BinError::Buzzer(detail),
        };
        eyre::Report::new(typed)
    })
}
