use std::time::{SystemTime, UNIX_EPOCH};

/// Returns the current time in whole seconds since the UNIX epoch.
///
/// Token expiry instants issued by the control plane use this unit. Falls
/// back to `0` if the system clock reports a time before the epoch.
///
/// # Example:
/// ```rust
/// use volc_speech::utils::now_unix;
/// let timestamp = now_unix();
/// ```
pub fn now_unix() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
