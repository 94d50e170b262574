//! The shop page and the htmx endpoints for the cart, buying and checking out.
//!
//! The endpoints answer with the whole shop page so the client can swap in
//! the fresh `main` element. Errors and rejected purchases answer with an
//! alert for `#alert-container` instead.

use axum::{
    Form,
    extract::{FromRef, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use serde::Deserialize;

use crate::{
    AppState, Error,
    alert::Alert,
    app_state::{SharedShop, lock_shop},
    endpoints::{self, format_endpoint},
    html::{
        BADGE_STYLE, BUTTON_PRIMARY_STYLE, BUTTON_SECONDARY_STYLE, CARD_STYLE,
        FORM_TEXT_INPUT_STYLE, PAGE_CONTAINER_STYLE, base, egg_badge, format_eggs,
    },
    navigation::NavBar,
    shop::{
        Accessory, Category, CategoryFilter, CheckoutSummary, InsufficientEggs, ItemId,
        PurchaseOutcome, Shop, SortOrder, find_accessory, search,
    },
    storage::KeyValueStore,
};

/// The state needed for the shop page and its endpoints.
#[derive(Debug, Clone)]
pub struct ShopState {
    pub shop: SharedShop,
}

impl FromRef<AppState> for ShopState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            shop: state.shop.clone(),
        }
    }
}

/// The search box, category tab and sort order of the shop page.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ShopQuery {
    #[serde(default)]
    pub search: String,
    pub category: Option<String>,
    #[serde(default)]
    pub sort: SortOrder,
}

impl ShopQuery {
    fn category_filter(&self) -> CategoryFilter {
        CategoryFilter::from(self.category.as_deref())
    }
}

/// Render the shop page.
pub async fn get_shop_page(
    State(state): State<ShopState>,
    Query(query): Query<ShopQuery>,
) -> Result<Response, Error> {
    let shop = lock_shop(&state.shop)?;

    Ok(shop_view(&shop, &query, None).into_response())
}

/// Put an accessory in the cart.
///
/// Owned accessories cannot be added, and an accessory that is already in the
/// cart is not added a second time.
pub async fn add_to_cart_endpoint(
    State(state): State<ShopState>,
    Path(item_id): Path<String>,
    Form(query): Form<ShopQuery>,
) -> Response {
    add_to_cart(&state, &ItemId::new(&item_id), &query).unwrap_or_else(Error::into_alert_response)
}

fn add_to_cart(state: &ShopState, item_id: &ItemId, query: &ShopQuery) -> Result<Response, Error> {
    let accessory = find_accessory(item_id)?;
    let mut shop = lock_shop(&state.shop)?;

    if shop.owned().contains(&accessory.id) {
        return Err(Error::AlreadyOwned(accessory.id.clone()));
    }

    let notice = if shop.cart().items().iter().any(|item| item.id == accessory.id) {
        Alert::SuccessSimple {
            message: format!("{} is already in your cart", accessory.name),
        }
    } else {
        shop.cart_mut().add(accessory);
        tracing::debug!("Added {} to the cart", accessory.id);

        Alert::SuccessSimple {
            message: format!("Added {} to your cart", accessory.name),
        }
    };

    Ok(shop_view(&shop, query, Some(notice)).into_response())
}

/// Buy a single accessory straight away.
///
/// Responds with a "Not Enough Golden Eggs" alert if the balance does not
/// cover the price, and refuses to sell an accessory that is already owned.
pub async fn purchase_endpoint(
    State(state): State<ShopState>,
    Path(item_id): Path<String>,
    Form(query): Form<ShopQuery>,
) -> Response {
    purchase(&state, &ItemId::new(&item_id), &query).unwrap_or_else(Error::into_alert_response)
}

fn purchase(state: &ShopState, item_id: &ItemId, query: &ShopQuery) -> Result<Response, Error> {
    let accessory = find_accessory(item_id)?;
    let mut shop = lock_shop(&state.shop)?;

    if shop.owned().contains(&accessory.id) {
        return Err(Error::AlreadyOwned(accessory.id.clone()));
    }

    match shop.purchase(accessory)? {
        PurchaseOutcome::Fulfilled(receipt) => {
            let notice = Alert::Success {
                message: format!("You bought {}!", accessory.name),
                details: format!(
                    "You have {} golden eggs left.",
                    format_eggs(receipt.balance)
                ),
            };

            Ok(shop_view(&shop, query, Some(notice)).into_response())
        }
        PurchaseOutcome::Rejected(rejection) => Ok((
            StatusCode::BAD_REQUEST,
            not_enough_eggs_alert(&accessory.name, &rejection).into_html(),
        )
            .into_response()),
    }
}

/// Buy everything in the cart, in the order it was added.
pub async fn checkout_endpoint(
    State(state): State<ShopState>,
    Form(query): Form<ShopQuery>,
) -> Response {
    checkout(&state, &query).unwrap_or_else(Error::into_alert_response)
}

fn checkout(state: &ShopState, query: &ShopQuery) -> Result<Response, Error> {
    let mut shop = lock_shop(&state.shop)?;

    let summary = shop.checkout()?;
    let notice = checkout_notice(&summary);

    Ok(shop_view(&shop, query, Some(notice)).into_response())
}

fn not_enough_eggs_alert(name: &str, rejection: &InsufficientEggs) -> Alert {
    Alert::Error {
        message: "Not Enough Golden Eggs".to_owned(),
        details: format!(
            "You need {} eggs to buy {name} but you only have {}. Earn {} more to get it!",
            format_eggs(rejection.price.get()),
            format_eggs(rejection.balance),
            format_eggs(rejection.shortfall())
        ),
    }
}

fn checkout_notice(summary: &CheckoutSummary) -> Alert {
    let spent = summary
        .fulfilled
        .iter()
        .fold(0u64, |total, receipt| total.saturating_add(receipt.price.get()));
    let skipped_names = summary
        .skipped
        .iter()
        .map(|rejection| {
            find_accessory(&rejection.item_id)
                .map(|accessory| accessory.name.clone())
                .unwrap_or_else(|_| rejection.item_id.to_string())
        })
        .collect::<Vec<_>>()
        .join(", ");

    match (summary.fulfilled.len(), summary.skipped.len()) {
        (0, 0) => Alert::SuccessSimple {
            message: "Your cart is empty".to_owned(),
        },
        (0, _) => Alert::Error {
            message: "Not Enough Golden Eggs".to_owned(),
            details: format!("You could not afford {skipped_names}."),
        },
        (bought, 0) => Alert::Success {
            message: "Checkout complete!".to_owned(),
            details: format!(
                "You bought {bought} {} for {} golden eggs.",
                plural_items(bought),
                format_eggs(spent)
            ),
        },
        (bought, _) => Alert::Success {
            message: "Checkout complete!".to_owned(),
            details: format!(
                "You bought {bought} {} for {} golden eggs. \
                There were not enough golden eggs left for {skipped_names}.",
                plural_items(bought),
                format_eggs(spent)
            ),
        },
    }
}

fn plural_items(count: usize) -> &'static str {
    if count == 1 { "item" } else { "items" }
}

fn shop_view<S: KeyValueStore>(shop: &Shop<S>, query: &ShopQuery, notice: Option<Alert>) -> Markup {
    let nav_bar = NavBar::new(endpoints::SHOP_VIEW).into_html();
    let filter = query.category_filter();
    let accessories = search(&query.search, filter, query.sort);

    let content = html! {
        (nav_bar)

        div class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-7xl space-y-6"
            {
                h1 class="text-3xl font-bold text-pink-600 dark:text-pink-400" { "Accessory Shop" }

                (filters_form(query, filter))

                main
                    hx-target="this"
                    hx-select="main"
                    hx-swap="outerHTML"
                    hx-include="#shop-filters"
                    hx-target-error="#alert-container"
                    class="space-y-6"
                {
                    div class="flex items-center justify-between"
                    {
                        div class="flex items-center gap-2"
                        {
                            (egg_badge(shop.balance()))
                            span class="text-gray-500 dark:text-gray-400" { "golden eggs" }
                        }

                        span id="cart-count" class=(BADGE_STYLE)
                        {
                            "🛒 Cart (" (shop.cart().len()) ")"
                        }
                    }

                    @if let Some(notice) = notice {
                        div id="notice" { (notice.into_markup()) }
                    }

                    @if accessories.is_empty() {
                        p class="text-center text-gray-500 dark:text-gray-400"
                        {
                            "No accessories match your search."
                        }
                    } @else {
                        div class="grid grid-cols-1 sm:grid-cols-2 md:grid-cols-3 lg:grid-cols-4 gap-6"
                        {
                            @for accessory in &accessories {
                                (accessory_card(accessory, shop.owned().contains(&accessory.id)))
                            }
                        }
                    }

                    (cart_summary(shop))
                }
            }
        }
    };

    base("Accessory Shop", &content)
}

fn filters_form(query: &ShopQuery, filter: CategoryFilter) -> Markup {
    let tab_style = "cursor-pointer rounded-lg px-3 py-2 text-center text-sm font-semibold \
        text-pink-700 dark:text-pink-300 peer-checked:bg-white peer-checked:shadow-sm \
        dark:peer-checked:bg-gray-700";

    html! {
        form
            id="shop-filters"
            action=(endpoints::SHOP_VIEW)
            method="get"
            hx-get=(endpoints::SHOP_VIEW)
            hx-trigger="input changed delay:300ms from:#search, change"
            hx-target="main"
            hx-select="main"
            hx-swap="outerHTML"
            hx-push-url="true"
            class="space-y-4"
        {
            div class="flex flex-col md:flex-row gap-4"
            {
                input
                    id="search"
                    type="search"
                    name="search"
                    value=(query.search)
                    placeholder="Search accessories..."
                    class=(FORM_TEXT_INPUT_STYLE);

                select
                    id="sort"
                    name="sort"
                    class="md:w-56 p-2.5 rounded text-sm bg-gray-50 border border-gray-300 \
                        dark:bg-gray-700 dark:border-gray-600 dark:text-white"
                {
                    @for sort in SortOrder::ALL {
                        option value=(sort.as_str()) selected[sort == query.sort] { (sort.label()) }
                    }
                }
            }

            div class="grid grid-cols-5 gap-1 rounded-lg bg-pink-100 p-1 dark:bg-gray-800"
            {
                (category_tab("all", "All", filter == CategoryFilter::All, tab_style))

                @for category in Category::ALL {
                    (category_tab(
                        category.as_str(),
                        category.title(),
                        filter == CategoryFilter::Only(category),
                        tab_style,
                    ))
                }
            }
        }
    }
}

fn category_tab(value: &str, title: &str, is_checked: bool, style: &str) -> Markup {
    let id = format!("category-{value}");

    html! {
        div
        {
            input
                id=(id)
                type="radio"
                name="category"
                value=(value)
                checked[is_checked]
                class="peer sr-only";

            label for=(id) class=(style) { (title) }
        }
    }
}

fn accessory_card(accessory: &Accessory, is_owned: bool) -> Markup {
    html! {
        article
            data-item-id=(accessory.id)
            class={ (CARD_STYLE) " overflow-hidden hover:shadow-lg transition-shadow" }
        {
            div class="relative h-48"
            {
                img src=(accessory.image) alt=(accessory.name) class="w-full h-full object-cover";

                div class="absolute top-2 right-2" { (egg_badge(accessory.price.get())) }
            }

            div class="p-4 space-y-2"
            {
                h3 class="text-lg font-semibold" { (accessory.name) }
                p class="text-sm text-gray-500 dark:text-gray-400 line-clamp-2" { (accessory.description) }
                span class=(BADGE_STYLE) { (accessory.category.title()) }
            }

            div class="px-4 pb-4 flex gap-2"
            {
                @if is_owned {
                    button type="button" disabled class=(BUTTON_SECONDARY_STYLE) { "✓ Owned" }
                } @else {
                    button
                        type="button"
                        hx-post=(format_endpoint(endpoints::CART_ITEM, &accessory.id))
                        class=(BUTTON_SECONDARY_STYLE)
                    {
                        "Add to Cart"
                    }

                    button
                        type="button"
                        hx-post=(format_endpoint(endpoints::PURCHASE, &accessory.id))
                        hx-confirm={
                            "Are you sure you want to purchase " (accessory.name)
                            " for " (accessory.price) " golden eggs?"
                        }
                        class=(BUTTON_PRIMARY_STYLE)
                    {
                        "Buy Now"
                    }
                }
            }
        }
    }
}

fn cart_summary<S: KeyValueStore>(shop: &Shop<S>) -> Markup {
    let cart = shop.cart();

    if cart.is_empty() {
        return html! {};
    }

    let total = cart.total();
    let can_afford = cart.can_afford(shop.balance());

    html! {
        section id="cart" class={ (CARD_STYLE) " p-6 space-y-4" }
        {
            div
            {
                h2 class="text-xl font-semibold" { "🛒 Shopping Cart" }
                p class="text-sm text-gray-500 dark:text-gray-400"
                {
                    "You have " (cart.len()) " " (plural_items(cart.len())) " in your cart"
                }
            }

            ul class="divide-y divide-gray-200 dark:divide-gray-700"
            {
                @for item in cart.items() {
                    li data-item-id=(item.id) class="flex justify-between items-center py-2"
                    {
                        div class="flex items-center gap-3"
                        {
                            img src=(item.image) alt=(item.name) class="w-12 h-12 object-cover rounded-md";
                            div
                            {
                                p class="font-medium" { (item.name) }
                                p class="text-sm text-gray-500 dark:text-gray-400" { (item.category.title()) }
                            }
                        }

                        (egg_badge(item.price.get()))
                    }
                }
            }

            div class="flex items-center justify-between"
            {
                p id="cart-total" class="font-bold" { "Total: " (egg_badge(total)) }

                div class="w-40"
                {
                    button
                        id="checkout-button"
                        type="button"
                        hx-post=(endpoints::CHECKOUT)
                        hx-confirm={
                            "Are you sure you want to purchase these items for "
                            (total) " golden eggs?"
                        }
                        disabled[!can_afford]
                        class=(BUTTON_PRIMARY_STYLE)
                    {
                        "Checkout"
                    }
                }
            }

            @if !can_afford {
                p class="text-sm text-red-600 dark:text-red-400"
                {
                    "You need " (format_eggs(total - shop.balance()))
                    " more golden eggs to buy everything in your cart."
                }
            }
        }
    }
}
