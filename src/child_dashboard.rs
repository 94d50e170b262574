//! The child's dashboard: their golden eggs, their doll and their collection.

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};

use crate::{
    AppState, Error,
    app_state::{SharedShop, lock_shop},
    doll::{Doll, DollSelection},
    endpoints,
    html::{BUTTON_PRIMARY_STYLE, CARD_STYLE, PAGE_CONTAINER_STYLE, base, egg_badge, link},
    navigation::NavBar,
    shop::{Accessory, catalog},
    storage::SqliteStore,
};

/// The state needed for the child's dashboard.
#[derive(Debug, Clone)]
pub struct ChildState {
    pub shop: SharedShop,
    pub store: SqliteStore,
}

impl FromRef<AppState> for ChildState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            shop: state.shop.clone(),
            store: state.store.clone(),
        }
    }
}

/// Display the child's dashboard.
pub async fn get_child_dashboard(State(state): State<ChildState>) -> Result<Response, Error> {
    let selection = DollSelection::load(&state.store)?;
    let shop = lock_shop(&state.shop)?;

    let collection: Vec<&Accessory> = catalog()
        .iter()
        .filter(|accessory| shop.owned().contains(&accessory.id))
        .collect();

    Ok(dashboard_view(shop.balance(), selection.doll(), &collection).into_response())
}

fn dashboard_view(balance: u64, doll: &Doll, collection: &[&Accessory]) -> Markup {
    let nav_bar = NavBar::new(endpoints::CHILD_VIEW).into_html();

    let content = html! {
        (nav_bar)

        div class=(PAGE_CONTAINER_STYLE)
        {
            main class="w-full max-w-5xl space-y-6"
            {
                div class="flex items-center justify-between"
                {
                    div
                    {
                        h1 class="text-3xl font-bold text-pink-600 dark:text-pink-400" { "Hello, Princess!" }
                        p class="text-gray-500 dark:text-gray-400" { "Keep studying to earn more golden eggs." }
                    }

                    div id="balance" { (egg_badge(balance)) }
                }

                div class="grid grid-cols-1 md:grid-cols-2 gap-6"
                {
                    section id="my-doll" class={ (CARD_STYLE) " p-6 space-y-4" }
                    {
                        h2 class="text-xl font-semibold" { "My Doll" }

                        div class="h-48 flex items-center justify-center rounded-md bg-gradient-to-b from-pink-100 to-purple-100"
                        {
                            img src=(doll.image) alt=(doll.name) class="h-full object-contain";
                        }

                        p class="font-medium" data-doll-id=(doll.id) { (doll.name) }
                        a href=(endpoints::DOLLS_VIEW) class=(BUTTON_PRIMARY_STYLE) { "Choose a Doll" }
                    }

                    section id="collection" class={ (CARD_STYLE) " p-6 space-y-4" }
                    {
                        h2 class="text-xl font-semibold" { "My Collection" }

                        @if collection.is_empty() {
                            p class="text-gray-500 dark:text-gray-400"
                            {
                                "You don't own any accessories yet. Visit the "
                                (link(endpoints::SHOP_VIEW, "shop"))
                                " to spend your golden eggs!"
                            }
                        } @else {
                            ul class="grid grid-cols-2 gap-3"
                            {
                                @for accessory in collection {
                                    li
                                        data-item-id=(accessory.id)
                                        class="flex items-center gap-2 rounded-lg bg-pink-50 p-2 dark:bg-gray-700"
                                    {
                                        img
                                            src=(accessory.image)
                                            alt=(accessory.name)
                                            class="h-10 w-10 rounded object-cover";
                                        span class="text-sm" { (accessory.name) }
                                    }
                                }
                            }

                            a href=(endpoints::SHOP_VIEW) class=(BUTTON_PRIMARY_STYLE) { "Visit the Shop" }
                        }
                    }
                }
            }
        }
    };

    base("My Eggs", &content)
}

#[cfg(test)]
mod tests {
    use axum::extract::State;
    use scraper::Selector;

    use crate::{
        doll::{DollSelection, dolls},
        shop::{ItemId, PurchaseOutcome, find_accessory},
        test_utils::{
            assert_status_ok, assert_valid_html, parse_html_document, shared_shop_with_balance,
        },
    };

    use super::{ChildState, get_child_dashboard};

    #[tokio::test]
    async fn shows_balance_doll_and_empty_collection() {
        let (shop, store) = shared_shop_with_balance(37);

        let response = get_child_dashboard(State(ChildState { shop, store }))
            .await
            .unwrap();

        assert_status_ok(&response);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        let balance = html
            .select(&Selector::parse("#balance").unwrap())
            .next()
            .unwrap()
            .text()
            .collect::<String>();
        assert!(balance.contains("37"), "got {balance}");
        let doll = html
            .select(&Selector::parse("#my-doll [data-doll-id]").unwrap())
            .next()
            .unwrap();
        assert_eq!(doll.value().attr("data-doll-id"), Some("1"));
        assert_eq!(
            html.select(&Selector::parse("#collection li").unwrap()).count(),
            0
        );
    }

    #[tokio::test]
    async fn shows_owned_accessories_and_selected_doll() {
        let (shop, store) = shared_shop_with_balance(100);
        let sunglasses = find_accessory(&ItemId::new("5")).unwrap();
        let outcome = shop.lock().unwrap().purchase(sunglasses).unwrap();
        assert!(matches!(outcome, PurchaseOutcome::Fulfilled(_)));
        DollSelection::load(&store)
            .unwrap()
            .select(&store, &dolls()[2])
            .unwrap();

        let response = get_child_dashboard(State(ChildState { shop, store }))
            .await
            .unwrap();

        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        let owned = html
            .select(&Selector::parse("#collection li").unwrap())
            .map(|item| item.value().attr("data-item-id").unwrap_or_default().to_owned())
            .collect::<Vec<_>>();
        assert_eq!(owned, ["5"]);
        let doll = html
            .select(&Selector::parse("#my-doll [data-doll-id]").unwrap())
            .next()
            .unwrap();
        assert_eq!(doll.value().attr("data-doll-id"), Some("3"));
    }
}
