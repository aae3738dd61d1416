//! Timeout configuration for staff-link client operations.

use std::time::Duration;

/// Timeout configuration for client operations.
///
/// # Examples
///
/// ```rust
/// use staff_link::StaffLinkTimeouts;
/// use std::time::Duration;
///
/// // Use defaults (recommended for most cases)
/// let timeouts = StaffLinkTimeouts::default();
///
/// // Custom bounds for a high-latency environment
/// let timeouts = StaffLinkTimeouts {
///     receive_timeout: Duration::from_secs(120),
///     ..StaffLinkTimeouts::default()
/// };
///
/// // Aggressive timeouts for local development
/// let timeouts = StaffLinkTimeouts::fast();
/// ```
#[derive(Debug, Clone)]
pub struct StaffLinkTimeouts {
    /// Timeout for establishing connections (TCP + TLS handshake).
    /// Default: 10 seconds
    pub connection_timeout: Duration,

    /// Timeout for receiving a response after a request is sent.
    /// Default: 30 seconds
    pub receive_timeout: Duration,

    /// Upper bound on the token refresh exchange. When it elapses, every
    /// request waiting on the refresh fails as if the refresh itself had
    /// failed (the session is terminated).
    /// Default: 15 seconds
    pub refresh_timeout: Duration,
}

impl Default for StaffLinkTimeouts {
    fn default() -> Self {
        Self {
            connection_timeout: Duration::from_secs(10),
            receive_timeout: Duration::from_secs(30),
            refresh_timeout: Duration::from_secs(15),
        }
    }
}

impl StaffLinkTimeouts {
    /// Timeouts optimized for fast local development.
    pub fn fast() -> Self {
        Self {
            connection_timeout: Duration::from_secs(2),
            receive_timeout: Duration::from_secs(5),
            refresh_timeout: Duration::from_secs(3),
        }
    }

    /// Timeouts optimized for high-latency or unreliable networks.
    pub fn relaxed() -> Self {
        Self {
            connection_timeout: Duration::from_secs(30),
            receive_timeout: Duration::from_secs(90),
            refresh_timeout: Duration::from_secs(45),
        }
    }
}
