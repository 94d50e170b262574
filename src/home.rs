//! The home page where the user picks child or parent mode.

use axum::response::{IntoResponse, Response};
use maud::html;

use crate::{endpoints, html::base};

/// Display the home page.
pub async fn get_home_page() -> Response {
    let mode_style = "h-32 rounded-xl flex flex-col items-center justify-center gap-2 \
        text-xl font-semibold text-white shadow-md transition-colors";

    let content = html! {
        div class="min-h-screen flex flex-col items-center justify-center p-4"
        {
            div class="w-full max-w-4xl space-y-8"
            {
                div class="text-center"
                {
                    h1 class="text-4xl md:text-5xl font-bold text-pink-600 mb-2" { "Golden Eggs" }
                    p class="text-lg text-purple-700 dark:text-purple-300"
                    {
                        "Earn golden eggs and build your doll collection!"
                    }
                }

                div class="rounded-lg bg-white/80 border border-pink-200 shadow-lg p-6 dark:bg-gray-800/80 dark:border-gray-700"
                {
                    h2 class="text-2xl font-semibold text-center mb-6 text-pink-600"
                    {
                        "Who's using the app today?"
                    }

                    div class="grid grid-cols-1 md:grid-cols-2 gap-6"
                    {
                        a
                            id="child-mode"
                            href=(endpoints::CHILD_VIEW)
                            class={ (mode_style) " bg-gradient-to-r from-pink-400 to-pink-500 hover:from-pink-500 hover:to-pink-600" }
                        {
                            span class="text-3xl" aria-hidden="true" { "🧒" }
                            "Child Mode"
                        }

                        a
                            id="parent-mode"
                            href=(endpoints::PARENT_VIEW)
                            class={ (mode_style) " bg-gradient-to-r from-purple-400 to-purple-500 hover:from-purple-500 hover:to-purple-600" }
                        {
                            span class="text-3xl" aria-hidden="true" { "🔒" }
                            "Parent Mode"
                        }
                    }
                }
            }
        }
    };

    base("Home", &content).into_response()
}

#[cfg(test)]
mod tests {
    use scraper::Selector;

    use crate::{
        endpoints,
        test_utils::{assert_status_ok, assert_valid_html, parse_html_document},
    };

    use super::get_home_page;

    #[tokio::test]
    async fn links_to_child_and_parent_modes() {
        let response = get_home_page().await;

        assert_status_ok(&response);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);

        let href = |selector: &str| {
            html.select(&Selector::parse(selector).unwrap())
                .next()
                .and_then(|link| link.value().attr("href"))
                .map(str::to_owned)
        };
        assert_eq!(href("#child-mode").as_deref(), Some(endpoints::CHILD_VIEW));
        assert_eq!(href("#parent-mode").as_deref(), Some(endpoints::PARENT_VIEW));
    }
}
