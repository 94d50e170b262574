//! The doll gallery carousel and the endpoint for choosing a doll.

use axum::{
    extract::{FromRef, Path, Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use serde::Deserialize;

use crate::{
    AppState, Error,
    alert::Alert,
    doll::{Doll, DollSelection, dolls, find_doll, next_index, previous_index},
    endpoints::{self, format_endpoint},
    html::{BUTTON_PRIMARY_STYLE, PAGE_CONTAINER_STYLE, base},
    navigation::NavBar,
    storage::SqliteStore,
};

/// The state needed for the doll gallery.
#[derive(Debug, Clone)]
pub struct DollState {
    pub store: SqliteStore,
}

impl FromRef<AppState> for DollState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            store: state.store.clone(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct GalleryQuery {
    /// The carousel position to show. Defaults to the selected doll.
    pub index: Option<usize>,
}

/// Render the doll gallery.
pub async fn get_dolls_page(
    State(state): State<DollState>,
    Query(query): Query<GalleryQuery>,
) -> Result<Response, Error> {
    let selection = DollSelection::load(&state.store)?;
    let index = query
        .index
        .map(|index| index % dolls().len())
        .unwrap_or_else(|| position_of(selection.doll()));

    Ok(gallery_view(index, &selection, None).into_response())
}

/// Make a doll the one shown on the child's dashboard.
pub async fn select_doll_endpoint(
    State(state): State<DollState>,
    Path(doll_id): Path<String>,
) -> Response {
    select_doll(&state, &doll_id).unwrap_or_else(Error::into_alert_response)
}

fn select_doll(state: &DollState, doll_id: &str) -> Result<Response, Error> {
    let doll = find_doll(doll_id)?;
    let mut selection = DollSelection::load(&state.store)?;
    selection.select(&state.store, doll)?;

    let notice = Alert::SuccessSimple {
        message: format!("{} is now your doll!", doll.name),
    };

    Ok(gallery_view(position_of(doll), &selection, Some(notice)).into_response())
}

fn position_of(doll: &Doll) -> usize {
    dolls()
        .iter()
        .position(|candidate| candidate.id == doll.id)
        .unwrap_or_default()
}

fn gallery_url(index: usize) -> String {
    format!("{}?index={index}", endpoints::DOLLS_VIEW)
}

fn gallery_view(index: usize, selection: &DollSelection, notice: Option<Alert>) -> Markup {
    let nav_bar = NavBar::new(endpoints::DOLLS_VIEW).into_html();
    let current = &dolls()[index];
    let is_selected = selection.is_selected(current);
    let arrow_style = "absolute top-1/2 -translate-y-1/2 z-10 flex h-10 w-10 items-center \
        justify-center rounded-full border border-pink-200 bg-white text-pink-500 shadow-md \
        hover:bg-pink-50";

    let content = html! {
        (nav_bar)

        div class=(PAGE_CONTAINER_STYLE)
        {
            main
                hx-target="this"
                hx-select="main"
                hx-swap="outerHTML"
                hx-target-error="#alert-container"
                class="w-full max-w-3xl flex flex-col items-center space-y-6 rounded-xl bg-pink-50 p-6 dark:bg-gray-800"
            {
                h1 class="text-3xl font-bold text-pink-600 dark:text-pink-400" { "Choose Your Doll" }

                @if let Some(notice) = notice {
                    div id="notice" class="w-full" { (notice.into_markup()) }
                }

                div class="relative w-full max-w-md"
                {
                    article
                        id="current-doll"
                        data-doll-id=(current.id)
                        class="overflow-hidden rounded-lg border-4 border-pink-300 bg-white shadow-xl"
                    {
                        div class="relative bg-gradient-to-b from-pink-100 to-purple-100"
                        {
                            img src=(current.image) alt=(current.name) class="w-full aspect-square object-cover";

                            @if is_selected {
                                span
                                    class="absolute top-4 right-4 rounded-full bg-pink-500 px-3 py-1 text-sm font-semibold text-white"
                                {
                                    "Selected"
                                }
                            }
                        }

                        div class="p-4 space-y-2"
                        {
                            h2 class="text-xl font-bold text-pink-600" { (current.name) }
                            p class="text-gray-600" { (current.description) }

                            button
                                type="button"
                                hx-post=(format_endpoint(endpoints::SELECT_DOLL, &current.id))
                                disabled[is_selected]
                                class=(BUTTON_PRIMARY_STYLE)
                            {
                                @if is_selected { "Selected" } @else { "Choose This Doll" }
                            }
                        }
                    }

                    a
                        id="previous-doll"
                        href=(gallery_url(previous_index(index)))
                        aria-label="Previous doll"
                        class={ (arrow_style) " left-0 -translate-x-1/2" }
                    {
                        "‹"
                    }

                    a
                        id="next-doll"
                        href=(gallery_url(next_index(index)))
                        aria-label="Next doll"
                        class={ (arrow_style) " right-0 translate-x-1/2" }
                    {
                        "›"
                    }
                }

                nav aria-label="Dolls" class="flex space-x-2 overflow-x-auto py-2"
                {
                    @for (position, doll) in dolls().iter().enumerate() {
                        a
                            href=(gallery_url(position))
                            title=(doll.name)
                            class=(thumbnail_style(position == index))
                        {
                            img src=(doll.image) alt=(doll.name) class="w-full h-full object-cover";

                            @if selection.is_selected(doll) {
                                span class="absolute inset-0 flex items-center justify-center bg-pink-500/30"
                                {
                                    span class="h-3 w-3 rounded-full bg-white" {}
                                }
                            }
                        }
                    }
                }

                div class="flex space-x-1"
                {
                    @for position in 0..dolls().len() {
                        span class=(dot_style(position == index)) {}
                    }
                }
            }
        }
    };

    base("Dolls", &content)
}

fn thumbnail_style(is_current: bool) -> &'static str {
    if is_current {
        "relative block w-16 h-16 overflow-hidden rounded-md ring-4 ring-pink-500"
    } else {
        "relative block w-16 h-16 overflow-hidden rounded-md ring-2 ring-transparent"
    }
}

fn dot_style(is_current: bool) -> &'static str {
    if is_current {
        "h-2 w-2 rounded-full bg-pink-500"
    } else {
        "h-2 w-2 rounded-full bg-pink-200"
    }
}
