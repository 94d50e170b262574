//! The configuration for the rewards app.

use time::Duration;

use crate::Error;

/// The balance a fresh install starts with.
pub const DEFAULT_INITIAL_BALANCE: u64 = 50;

/// The password that opens the parent panel.
///
/// This is a literal string comparison and is not meant as access control.
pub const DEFAULT_PARENT_PASSWORD: &str = "1234";

/// How long the parent stays logged in to the parent panel.
pub const DEFAULT_PARENT_SESSION_DURATION: Duration = Duration::minutes(15);

/// The timezone used to date rewards when none is configured.
pub const DEFAULT_TIMEZONE: &str = "Etc/UTC";

/// Settings for the ledger, the parent gate and dating rewards.
///
/// Construct with [RewardsConfig::new] so the values are validated once,
/// or start from [RewardsConfig::default] in tests.
#[derive(Debug, Clone, PartialEq)]
pub struct RewardsConfig {
    /// The balance used when no valid balance has been stored.
    pub initial_balance: u64,
    /// The password for the parent panel.
    pub parent_password: String,
    /// How long the parent session cookie is valid for.
    pub parent_session_duration: Duration,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl Default for RewardsConfig {
    fn default() -> Self {
        Self {
            initial_balance: DEFAULT_INITIAL_BALANCE,
            parent_password: DEFAULT_PARENT_PASSWORD.to_owned(),
            parent_session_duration: DEFAULT_PARENT_SESSION_DURATION,
            local_timezone: DEFAULT_TIMEZONE.to_owned(),
        }
    }
}

impl RewardsConfig {
    /// Create a validated config.
    ///
    /// # Errors
    /// Returns [Error::InvalidConfig] if the parent password is empty, the
    /// session duration is not positive or the timezone is not a canonical
    /// timezone name.
    pub fn new(
        initial_balance: u64,
        parent_password: &str,
        parent_session_duration: Duration,
        local_timezone: &str,
    ) -> Result<Self, Error> {
        if parent_password.is_empty() {
            return Err(Error::InvalidConfig(
                "the parent password cannot be empty".to_owned(),
            ));
        }

        if !parent_session_duration.is_positive() {
            return Err(Error::InvalidConfig(format!(
                "the parent session duration must be positive, got {parent_session_duration}"
            )));
        }

        if time_tz::timezones::get_by_name(local_timezone).is_none() {
            return Err(Error::InvalidConfig(format!(
                "\"{local_timezone}\" is not a canonical timezone name"
            )));
        }

        Ok(Self {
            initial_balance,
            parent_password: parent_password.to_owned(),
            parent_session_duration,
            local_timezone: local_timezone.to_owned(),
        })
    }
}
