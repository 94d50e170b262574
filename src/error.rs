//! Defines the app level error type and conversions to rendered HTML pages and alerts.
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{
    alert::Alert, internal_server_error::InternalServerError, not_found::NotFoundError,
    shop::ItemId,
};

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The parent password did not match.
    #[error("invalid password")]
    InvalidCredentials,

    /// The parent session cookie is missing from the cookie jar in the request.
    #[error("no cookies in the cookie jar :(")]
    CookieMissing,

    /// There was an error formatting or parsing the expiry date time of the
    /// parent session cookie.
    #[error("could not format parent cookie expiry: {0}")]
    InvalidDateFormat(String),

    /// An amount of golden eggs was zero where a positive amount is required.
    #[error("an amount of golden eggs must be at least one")]
    ZeroEggAmount,

    /// An empty string was used as the title of a study goal.
    #[error("Goal title cannot be empty")]
    EmptyGoalTitle,

    /// The app configuration failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct.
    #[error("the requested resource could not be found")]
    NotFound,

    /// Tried to buy an accessory that has already been bought.
    ///
    /// The purchase workflow itself does not check ownership, so route
    /// handlers must return this error before starting a purchase.
    #[error("the accessory {0} is already owned")]
    AlreadyOwned(ItemId),

    /// Every study goal ID has been used.
    #[error("there are no study goal IDs left")]
    TooManyGoals,

    /// Tried to complete a study goal a second time.
    #[error("the study goal has already been completed")]
    GoalAlreadyCompleted,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// An error occurred while serializing a value as JSON for storage.
    #[error("could not serialize as JSON: {0}")]
    JSONSerializationError(String),

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// Could not acquire a lock on the shop state or the database connection.
    #[error("could not acquire the storage lock")]
    StorageLock,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        tracing::error!("an unhandled SQL error occurred: {}", value);
        Error::SqlError(value)
    }
}

impl From<serde_json::Error> for Error {
    fn from(value: serde_json::Error) -> Self {
        Error::JSONSerializationError(value.to_string())
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound => NotFoundError.into_response(),
            Error::InvalidTimezoneError(timezone) => InternalServerError {
                description: "Invalid Timezone Settings",
                fix: &format!(
                    "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                ),
            }
            .into_response(),
            Error::StorageLock => InternalServerError::default().into_response(),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                InternalServerError::default().into_response()
            }
        }
    }
}

impl Error {
    /// Convert the error into an HTTP response with an HTML alert.
    pub fn into_alert_response(self) -> Response {
        let (status_code, alert) = match self {
            Error::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                Alert::Error {
                    message: "Incorrect password".to_owned(),
                    details: "Ask a grown-up to enter the parent password.".to_owned(),
                },
            ),
            Error::ZeroEggAmount => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Invalid number of eggs".to_owned(),
                    details: "Enter a number of golden eggs that is at least one.".to_owned(),
                },
            ),
            Error::EmptyGoalTitle => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Missing goal title".to_owned(),
                    details: "Give the study goal a title.".to_owned(),
                },
            ),
            Error::NotFound => (
                StatusCode::NOT_FOUND,
                Alert::Error {
                    message: "Not found".to_owned(),
                    details: "The item could not be found. Try refreshing the page.".to_owned(),
                },
            ),
            Error::AlreadyOwned(item_id) => (
                StatusCode::CONFLICT,
                Alert::Error {
                    message: "Already in your collection".to_owned(),
                    details: format!("The accessory {item_id} has already been bought."),
                },
            ),
            Error::TooManyGoals => (
                StatusCode::CONFLICT,
                Alert::Error {
                    message: "Too many goals".to_owned(),
                    details: "No more study goals can be added.".to_owned(),
                },
            ),
            Error::GoalAlreadyCompleted => (
                StatusCode::CONFLICT,
                Alert::Error {
                    message: "Goal already completed".to_owned(),
                    details: "The eggs for this goal have already been given.".to_owned(),
                },
            ),
            Error::InvalidTimezoneError(timezone) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Alert::Error {
                    message: "Invalid Timezone Settings".to_owned(),
                    details: format!(
                        "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                    ),
                },
            ),
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Alert::Error {
                    message: "Something went wrong".to_owned(),
                    details:
                        "An unexpected error occurred, check the server logs for more details."
                            .to_owned(),
                },
            ),
        };

        (status_code, alert.into_html()).into_response()
    }
}
