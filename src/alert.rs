//! Alert system for displaying success and error messages to users.
//!
//! Alerts are swapped into the `#alert-container` element of the base page by
//! htmx and can be dismissed by the user.

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use maud::{Markup, html};

/// An alert message to render as an HTML fragment.
#[derive(Debug, Clone, PartialEq)]
pub enum Alert {
    Success { message: String, details: String },
    SuccessSimple { message: String },
    Error { message: String, details: String },
}

impl Alert {
    pub fn into_markup(self) -> Markup {
        let (container_style, message, details) = match self {
            Alert::Success { message, details } => (SUCCESS_STYLE, message, details),
            Alert::SuccessSimple { message } => (SUCCESS_STYLE, message, String::new()),
            Alert::Error { message, details } => (ERROR_STYLE, message, details),
        };

        html!(
            div
                role="alert"
                class=(container_style)
                hx-on:click="this.remove()"
            {
                p class="font-semibold" { (message) }

                @if !details.is_empty() {
                    p class="text-sm" { (details) }
                }
            }
        )
    }

    pub fn into_html(self) -> Html<String> {
        Html(self.into_markup().into_string())
    }
}

impl IntoResponse for Alert {
    fn into_response(self) -> Response {
        (StatusCode::OK, self.into_html()).into_response()
    }
}

const SUCCESS_STYLE: &str = "p-4 mb-4 rounded-lg cursor-pointer text-green-800 \
    bg-green-50 dark:bg-gray-800 dark:text-green-400";

const ERROR_STYLE: &str = "p-4 mb-4 rounded-lg cursor-pointer text-red-800 \
    bg-red-50 dark:bg-gray-800 dark:text-red-400";

#[cfg(test)]
mod tests {
    use scraper::{Html, Selector};

    use super::Alert;

    #[test]
    fn error_alert_shows_message_and_details() {
        let markup = Alert::Error {
            message: "Not Enough Golden Eggs".to_owned(),
            details: "You need 5 more eggs.".to_owned(),
        }
        .into_markup()
        .into_string();

        let html = Html::parse_fragment(&markup);
        let text: Vec<String> = html
            .select(&Selector::parse("p").unwrap())
            .map(|p| p.text().collect())
            .collect();

        assert_eq!(text, vec!["Not Enough Golden Eggs", "You need 5 more eggs."]);
    }

    #[test]
    fn simple_alert_has_no_details() {
        let markup = Alert::SuccessSimple {
            message: "Bought!".to_owned(),
        }
        .into_markup()
        .into_string();

        let html = Html::parse_fragment(&markup);
        let paragraphs = html.select(&Selector::parse("p").unwrap()).count();

        assert_eq!(paragraphs, 1);
    }
}
