//! Middleware that keeps the parent panel behind the parent password.

use axum::{
    extract::{FromRef, FromRequestParts, Request, State},
    http::{StatusCode, header::SET_COOKIE},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use axum_htmx::HxRedirect;
use time::Duration;

use crate::{
    AppState, endpoints,
    parent::cookie::{extend_parent_session, get_parent_session_expiry},
};

/// The state needed for the parent guard.
#[derive(Clone)]
pub struct ParentGuardState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// How long the parent session lasts after the last parent request.
    pub session_duration: Duration,
}

impl FromRef<AppState> for ParentGuardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            session_duration: state.config.parent_session_duration,
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<ParentGuardState> for Key {
    fn from_ref(state: &ParentGuardState) -> Self {
        state.cookie_key.clone()
    }
}

#[inline]
async fn parent_guard_internal(
    state: ParentGuardState,
    request: Request,
    next: Next,
    get_redirect: impl Fn(&str) -> Response,
) -> Response {
    let (mut parts, body) = request.into_parts();
    let jar = match PrivateCookieJar::from_request_parts(&mut parts, &state).await {
        Ok(jar) => jar,
        Err(err) => {
            tracing::error!("Error getting cookie jar: {err:?}. Redirecting to parent log in.");
            return get_redirect(endpoints::PARENT_LOG_IN_VIEW);
        }
    };

    if let Err(error) = get_parent_session_expiry(&jar) {
        tracing::debug!("No valid parent session ({error}), redirecting to parent log in.");
        return get_redirect(endpoints::PARENT_LOG_IN_VIEW);
    }

    let request = Request::from_parts(parts, body);
    let response = next.run(request).await;

    let (mut parts, body) = response.into_parts();
    let jar = match extend_parent_session(jar.clone(), state.session_duration) {
        Ok(updated_jar) => updated_jar,
        Err(err) => {
            tracing::error!("Error extending parent session: {err:?}. Rolling back cookie jar.");
            jar
        }
    };
    for (key, val) in jar.into_response().headers().iter() {
        if key != SET_COOKIE {
            continue;
        }

        parts.headers.append(key, val.to_owned());
    }

    Response::from_parts(parts, body)
}

/// Middleware function that checks for a valid parent session cookie.
///
/// The request is executed normally if the session is valid and the session
/// is extended, otherwise a redirect to the parent log-in page is returned.
///
/// **Note**: The app state must contain an `axum_extra::extract::cookie::Key` for decrypting and verifying the cookie contents.
pub async fn parent_guard(
    State(state): State<ParentGuardState>,
    request: Request,
    next: Next,
) -> Response {
    parent_guard_internal(state, request, next, |redirect_url| {
        Redirect::to(redirect_url).into_response()
    })
    .await
}

/// Like [parent_guard], but responds with a HTMX redirect for requests made by htmx.
pub async fn parent_guard_hx(
    State(state): State<ParentGuardState>,
    request: Request,
    next: Next,
) -> Response {
    parent_guard_internal(state, request, next, |redirect_url| {
        (HxRedirect(redirect_url.to_owned()), StatusCode::OK).into_response()
    })
    .await
}
