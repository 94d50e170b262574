//! Application router configuration with public and parent-only route definitions.

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::{
    AppState,
    child_dashboard::get_child_dashboard,
    doll::{get_dolls_page, select_doll_endpoint},
    endpoints,
    home::get_home_page,
    internal_server_error::get_internal_server_error_page,
    logging::logging_middleware,
    not_found::get_404_not_found,
    parent::{
        add_goal_endpoint, award_eggs_endpoint, complete_goal_endpoint, get_parent_log_in_page,
        get_parent_log_out, get_parent_page, parent_guard, parent_guard_hx, post_parent_log_in,
    },
    shop::{add_to_cart_endpoint, checkout_endpoint, get_shop_page, purchase_endpoint},
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let child_routes = Router::new()
        .route(endpoints::ROOT, get(get_home_page))
        .route(endpoints::CHILD_VIEW, get(get_child_dashboard))
        .route(endpoints::SHOP_VIEW, get(get_shop_page))
        .route(endpoints::DOLLS_VIEW, get(get_dolls_page))
        .route(endpoints::CART_ITEM, post(add_to_cart_endpoint))
        .route(endpoints::PURCHASE, post(purchase_endpoint))
        .route(endpoints::CHECKOUT, post(checkout_endpoint))
        .route(endpoints::SELECT_DOLL, post(select_doll_endpoint))
        .route(endpoints::PARENT_LOG_IN_VIEW, get(get_parent_log_in_page))
        .route(endpoints::PARENT_LOG_IN_API, post(post_parent_log_in))
        .route(endpoints::PARENT_LOG_OUT, get(get_parent_log_out))
        .route(
            endpoints::INTERNAL_ERROR_VIEW,
            get(get_internal_server_error_page),
        );

    let parent_routes = Router::new()
        .route(endpoints::PARENT_VIEW, get(get_parent_page))
        .layer(middleware::from_fn_with_state(state.clone(), parent_guard));

    // These POST routes need to use the HX-REDIRECT header for the parent gate to redirect HTMX requests.
    let parent_routes = parent_routes.merge(
        Router::new()
            .route(endpoints::REWARDS_API, post(award_eggs_endpoint))
            .route(endpoints::GOALS_API, post(add_goal_endpoint))
            .route(endpoints::COMPLETE_GOAL, post(complete_goal_endpoint))
            .layer(middleware::from_fn_with_state(state.clone(), parent_guard_hx)),
    );

    parent_routes
        .merge(child_routes)
        .fallback(get_404_not_found)
        .layer(middleware::from_fn(logging_middleware))
        .with_state(state)
}
