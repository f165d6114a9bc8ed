//! Human-readable error descriptions, exit codes and structured JSON errors.

use smartbin_core::error::{BinError, BuildError};

/// Failures before the control loop starts.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("hardware init failed: {0}")]
    Hardware(String),
}

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    if let Some(se) = err.downcast_ref::<StartupError>() {
        return match se {
            StartupError::Config(msg) => format!(
                "What happened: Configuration is invalid or unreadable ({msg}).\nLikely causes: Wrong --config path, TOML syntax error, or an out-of-range value.\nHow to fix: Edit the config file (see etc/smartbin.toml for a sample), then rerun."
            ),
            StartupError::Hardware(msg) => format!(
                "What happened: Failed to initialize hardware ({msg}).\nLikely causes: Incorrect pin numbers, missing GPIO permissions, or PWM not enabled on the servo pin.\nHow to fix: Check [pins] in the config and run with access to /dev/gpiomem."
            ),
        };
    }

    if let Some(be) = err.downcast_ref::<BuildError>() {
        return match be {
            BuildError::InvalidConfig(msg) => format!(
                "What happened: Invalid configuration ({msg}).\nLikely causes: Out-of-range values in the TOML.\nHow to fix: Edit the config file, then rerun."
            ),
            missing => format!(
                "What happened: The controller could not be assembled ({missing}).\nLikely causes: A device failed to initialize and was not wired into the builder.\nHow to fix: Re-run with --log-level=debug to see which device failed."
            ),
        };
    }

    if let Some(BinError::Actuator(detail)) = err.downcast_ref::<BinError>() {
        return format!(
            "What happened: The lid servo rejected a command ({detail}).\nLikely causes: Servo not powered, wrong pin, or PWM unavailable.\nHow to fix: Check servo wiring and [pins] servo, then rerun."
        );
    }

    let msg = err.to_string();
    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// 2 for configuration problems, 3 for hardware bring-up, 1 otherwise.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    if let Some(se) = err.downcast_ref::<StartupError>() {
        return match se {
            StartupError::Config(_) => 2,
            StartupError::Hardware(_) => 3,
        };
    }
    match err.downcast_ref::<BuildError>() {
        Some(BuildError::InvalidConfig(_)) => 2,
        Some(_) => 3,
        None if matches!(err.downcast_ref::<BinError>(), Some(BinError::Actuator(_))) => 3,
        None => 1,
    }
}

fn reason_name(err: &eyre::Report) -> &'static str {
    match exit_code_for_error(err) {
        2 => "ConfigInvalid",
        3 => "HardwareInit",
        _ => "Error",
    }
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    serde_json::json!({
        "reason": reason_name(err),
        "exit_code": exit_code_for_error(err),
        "message": humanize(err),
    })
    .to_string()
}
