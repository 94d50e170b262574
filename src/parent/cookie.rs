//! The private cookie that marks the parent panel as unlocked.

use std::cmp::max;

use axum_extra::extract::{
    PrivateCookieJar,
    cookie::{Cookie, SameSite},
};
use time::{
    Duration, OffsetDateTime, format_description::BorrowedFormatItem, macros::format_description,
};

use crate::Error;

pub(crate) const COOKIE_PARENT_SESSION: &str = "parent_session";

/// Date time format for the session expiry, e.g. "2021-01-01 00:00:00.000000 +00:00:00".
const DATE_TIME_FORMAT: &[BorrowedFormatItem] = format_description!(
    "[year]-[month]-[day] [hour]:[minute]:[second].[subsecond] [offset_hour \
         sign:mandatory]:[offset_minute]:[offset_second]"
);

/// Add the parent session cookie to the cookie jar, expiring `duration` from now.
///
/// # Errors
///
/// Returns [Error::InvalidDateFormat] if the expiry time cannot be formatted.
pub(crate) fn set_parent_cookie(
    jar: PrivateCookieJar,
    duration: Duration,
) -> Result<PrivateCookieJar, Error> {
    set_parent_cookie_expiry(jar, OffsetDateTime::now_utc() + duration)
}

fn set_parent_cookie_expiry(
    jar: PrivateCookieJar,
    expiry: OffsetDateTime,
) -> Result<PrivateCookieJar, Error> {
    // Use format instead of to_string to avoid errors at midnight when the hour is printed as
    // a single digit when [DATE_TIME_FORMAT] expects two digits.
    let expiry_string = expiry
        .format(DATE_TIME_FORMAT)
        .map_err(|error| Error::InvalidDateFormat(error.to_string()))?;

    Ok(jar.add(
        Cookie::build((COOKIE_PARENT_SESSION, expiry_string))
            .expires(expiry)
            .path("/")
            .http_only(true)
            .same_site(SameSite::Strict),
    ))
}

/// Set the parent cookie to an invalid value and set its max age to zero,
/// which should delete the cookie on the client side.
pub(crate) fn invalidate_parent_cookie(jar: PrivateCookieJar) -> PrivateCookieJar {
    jar.add(
        Cookie::build((COOKIE_PARENT_SESSION, "deleted"))
            .expires(OffsetDateTime::UNIX_EPOCH)
            .max_age(Duration::ZERO)
            .path("/")
            .http_only(true)
            .same_site(SameSite::Strict),
    )
}

/// Get the expiry of the parent session if the cookie is present and has not expired.
///
/// # Errors
///
/// Returns:
/// - [Error::CookieMissing] if there is no parent session cookie.
/// - [Error::InvalidDateFormat] if the cookie does not hold a date time.
/// - [Error::InvalidCredentials] if the session has expired.
pub(crate) fn get_parent_session_expiry(jar: &PrivateCookieJar) -> Result<OffsetDateTime, Error> {
    let cookie = jar.get(COOKIE_PARENT_SESSION).ok_or(Error::CookieMissing)?;
    let expiry = OffsetDateTime::parse(cookie.value_trimmed(), DATE_TIME_FORMAT)
        .map_err(|error| Error::InvalidDateFormat(error.to_string()))?;

    if expiry <= OffsetDateTime::now_utc() {
        return Err(Error::InvalidCredentials);
    }

    Ok(expiry)
}

/// Push the session expiry out to the later of now plus `duration` and the
/// current expiry.
///
/// # Errors
///
/// The cookie jar is not modified if an error is returned. See
/// [get_parent_session_expiry] for the errors.
pub(crate) fn extend_parent_session(
    jar: PrivateCookieJar,
    duration: Duration,
) -> Result<PrivateCookieJar, Error> {
    let current_expiry = get_parent_session_expiry(&jar)?;
    let new_expiry = OffsetDateTime::now_utc()
        .checked_add(duration)
        .ok_or_else(|| Error::InvalidDateFormat("session expiry overflowed".to_owned()))?;

    set_parent_cookie_expiry(jar, max(current_expiry, new_expiry))
}

#[cfg(test)]
mod cookie_tests {
    use axum_extra::extract::{
        PrivateCookieJar,
        cookie::{Cookie, Key, SameSite},
    };
    use sha2::{Digest, Sha512};
    use time::{Duration, OffsetDateTime};

    use crate::Error;

    use super::{
        COOKIE_PARENT_SESSION, extend_parent_session, get_parent_session_expiry,
        invalidate_parent_cookie, set_parent_cookie,
    };

    fn get_jar() -> PrivateCookieJar {
        let hash = Sha512::digest(b"foobar");
        let key = Key::from(&hash);

        PrivateCookieJar::new(key)
    }

    /// Test helper macro to assert that two date times are within one second
    /// of each other. Used instead of a function so that the file and line
    /// number of the caller is included in the error message instead of the
    /// helper.
    macro_rules! assert_date_time_close {
        ($left:expr, $right:expr) => {
            assert!(
                ($left - $right).abs() < Duration::seconds(1),
                "got date time {:?}, want {:?}",
                $left,
                $right
            );
        };
    }

    #[test]
    fn set_cookie_expires_after_duration() {
        let jar = set_parent_cookie(get_jar(), Duration::minutes(15)).unwrap();

        let got = get_parent_session_expiry(&jar).unwrap();

        assert_date_time_close!(got, OffsetDateTime::now_utc() + Duration::minutes(15));
        let cookie = jar.get(COOKIE_PARENT_SESSION).unwrap();
        assert_eq!(cookie.expires_datetime(), Some(got));
    }

    #[test]
    fn session_cookie_works_over_plain_http() {
        let jar = set_parent_cookie(get_jar(), Duration::minutes(15)).unwrap();

        let cookie = jar.get(COOKIE_PARENT_SESSION).unwrap();

        assert_eq!(cookie.secure(), None);
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Strict));
        assert_eq!(cookie.path(), Some("/"));
    }

    #[test]
    fn missing_cookie_is_an_error() {
        assert_eq!(
            get_parent_session_expiry(&get_jar()),
            Err(Error::CookieMissing)
        );
    }

    #[test]
    fn expired_cookie_is_invalid() {
        let jar = set_parent_cookie(get_jar(), Duration::seconds(-5)).unwrap();

        assert_eq!(
            get_parent_session_expiry(&jar),
            Err(Error::InvalidCredentials)
        );
    }

    #[test]
    fn garbage_cookie_is_invalid() {
        let jar = get_jar().add(Cookie::new(COOKIE_PARENT_SESSION, "tomorrow"));

        assert!(matches!(
            get_parent_session_expiry(&jar),
            Err(Error::InvalidDateFormat(_))
        ));
    }

    #[test]
    fn extend_moves_expiry_forward() {
        let jar = set_parent_cookie(get_jar(), Duration::seconds(5)).unwrap();

        let jar = extend_parent_session(jar, Duration::minutes(10)).unwrap();

        assert_date_time_close!(
            get_parent_session_expiry(&jar).unwrap(),
            OffsetDateTime::now_utc() + Duration::minutes(10)
        );
    }

    #[test]
    fn extend_never_shortens_session() {
        let jar = set_parent_cookie(get_jar(), Duration::minutes(10)).unwrap();
        let want = get_parent_session_expiry(&jar).unwrap();

        let jar = extend_parent_session(jar, Duration::seconds(5)).unwrap();

        assert_eq!(get_parent_session_expiry(&jar), Ok(want));
    }

    #[test]
    fn invalidate_cookie_ends_session() {
        let jar = set_parent_cookie(get_jar(), Duration::minutes(15)).unwrap();

        let jar = invalidate_parent_cookie(jar);
        let cookie = jar.get(COOKIE_PARENT_SESSION).unwrap();

        assert_eq!(cookie.value(), "deleted");
        assert_eq!(cookie.max_age(), Some(Duration::ZERO));
        assert!(get_parent_session_expiry(&jar).is_err());
    }
}
