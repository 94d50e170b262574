//! The page for unlocking the parent panel and the routes for entering and
//! leaving it.

use axum::{
    Form,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use serde::Deserialize;
use time::Duration;

use crate::{
    AppState, endpoints,
    html::{BUTTON_PRIMARY_STYLE, CARD_STYLE, base, link, loading_spinner, password_input},
    parent::cookie::{invalidate_parent_cookie, set_parent_cookie},
};

pub const INVALID_PASSWORD_ERROR_MSG: &str = "Incorrect password.";

/// The state needed to check the parent password.
#[derive(Debug, Clone)]
pub struct ParentLogInState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    pub parent_password: String,
    /// How long the parent session lasts after logging in.
    pub session_duration: Duration,
}

impl FromRef<AppState> for ParentLogInState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            parent_password: state.config.parent_password.clone(),
            session_duration: state.config.parent_session_duration,
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<ParentLogInState> for Key {
    fn from_ref(state: &ParentLogInState) -> Self {
        state.cookie_key.clone()
    }
}

/// The password entered in the parent log-in form.
#[derive(Clone, Deserialize)]
pub struct ParentLogInData {
    pub password: String,
}

fn log_in_form(error_message: Option<&str>) -> Markup {
    html! {
        form
            hx-post=(endpoints::PARENT_LOG_IN_API)
            hx-swap="outerHTML"
            hx-indicator="#indicator"
            hx-disabled-elt="#password, #submit-button"
            class="space-y-4 md:space-y-6"
        {
            (password_input(error_message))

            button type="submit" id="submit-button" tabindex="0" class=(BUTTON_PRIMARY_STYLE)
            {
                span class="inline htmx-indicator" id="indicator"
                {
                    (loading_spinner())
                }
                "Unlock"
            }

            p class="text-sm font-light text-gray-500 dark:text-gray-400"
            {
                "Not a grown-up? "
                (link(endpoints::CHILD_VIEW, "Go to your dashboard"))
            }
        }
    }
}

/// Display the parent log-in page.
pub async fn get_parent_log_in_page() -> Response {
    let content = html! {
        div class="flex flex-col items-center justify-center px-6 py-8 mx-auto min-h-screen"
        {
            div class={ (CARD_STYLE) " w-full sm:max-w-md" }
            {
                div class="p-6 space-y-4 md:space-y-6 sm:p-8"
                {
                    div class="text-center text-5xl" { "🔒" }

                    h1 class="text-center text-xl font-bold text-gray-900 md:text-2xl dark:text-white"
                    {
                        "Parent Access"
                    }

                    p class="text-center text-sm text-gray-500 dark:text-gray-400"
                    {
                        "Enter your password to access the admin panel"
                    }

                    (log_in_form(None))
                }
            }
        }
    };

    base("Parent Log In", &content).into_response()
}

/// Handler for parent log-in requests via the POST method.
///
/// On the right password the parent session cookie is set and the client is
/// redirected to the parent panel. Otherwise, the form is returned with an
/// error message.
pub async fn post_parent_log_in(
    State(state): State<ParentLogInState>,
    jar: PrivateCookieJar,
    Form(form): Form<ParentLogInData>,
) -> Response {
    if form.password != state.parent_password {
        tracing::info!("Parent log-in attempt with an incorrect password");
        return log_in_form(Some(INVALID_PASSWORD_ERROR_MSG)).into_response();
    }

    set_parent_cookie(jar.clone(), state.session_duration)
        .map(|updated_jar| {
            tracing::info!("Parent panel unlocked");
            (
                StatusCode::OK,
                HxRedirect(endpoints::PARENT_VIEW.to_owned()),
                updated_jar,
            )
        })
        .map_err(|error| {
            tracing::error!("Error setting parent cookie: {error}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                HxRedirect(endpoints::INTERNAL_ERROR_VIEW.to_owned()),
                invalidate_parent_cookie(jar),
            )
        })
        .into_response()
}

/// Invalidate the parent session cookie and redirect the client to the home page.
pub async fn get_parent_log_out(jar: PrivateCookieJar) -> Response {
    let jar = invalidate_parent_cookie(jar);

    (jar, Redirect::to(endpoints::ROOT)).into_response()
}
