//! The API endpoints URIs.
//!
//! For endpoints that take a parameter, e.g., '/api/purchases/{item_id}', use [format_endpoint].

use std::fmt::Display;

/// The root route which lets the user pick child or parent mode.
pub const ROOT: &str = "/";
/// The child's dashboard with their balance, doll and collection.
pub const CHILD_VIEW: &str = "/child";
/// The accessory shop.
pub const SHOP_VIEW: &str = "/shop";
/// The doll gallery.
pub const DOLLS_VIEW: &str = "/dolls";
/// The page for entering the parent password.
pub const PARENT_LOG_IN_VIEW: &str = "/parent/log_in";
/// The parent panel for giving eggs and managing study goals.
pub const PARENT_VIEW: &str = "/parent";
/// The page to display when an internal server error occurs.
pub const INTERNAL_ERROR_VIEW: &str = "/error";

/// The route for adding an accessory to the cart.
pub const CART_ITEM: &str = "/api/cart/{item_id}";
/// The route for buying a single accessory.
pub const PURCHASE: &str = "/api/purchases/{item_id}";
/// The route for buying everything in the cart.
pub const CHECKOUT: &str = "/api/checkout";
/// The route for choosing the displayed doll.
pub const SELECT_DOLL: &str = "/api/dolls/{doll_id}";
/// The route for checking the parent password.
pub const PARENT_LOG_IN_API: &str = "/api/parent/log_in";
/// The route for leaving the parent panel.
pub const PARENT_LOG_OUT: &str = "/api/parent/log_out";
/// The route for giving golden eggs.
pub const REWARDS_API: &str = "/api/rewards";
/// The route for adding a study goal.
pub const GOALS_API: &str = "/api/goals";
/// The route for marking a study goal as completed.
pub const COMPLETE_GOAL: &str = "/api/goals/{goal_id}/complete";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/api/dolls/{doll_id}', '{doll_id}' is the parameter.
///
/// This function assumes that an endpoint path only contains ASCII characters
/// and a single parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// the original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: impl Display) -> String {
    let Some(param_start) = endpoint_path.find('{') else {
        return endpoint_path.to_string();
    };

    let param_end = endpoint_path[param_start..]
        .find('}')
        .map(|end| param_start + end + 1)
        .unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}

// These tests are here so that we know when we call `Uri::from_shared` it will not panic.
#[cfg(test)]
mod endpoints_tests {
    use axum::http::Uri;

    use crate::endpoints;

    use super::format_endpoint;

    fn assert_endpoint_is_valid_uri(uri: &str) {
        assert!(uri.parse::<Uri>().is_ok());
    }

    #[test]
    fn endpoints_are_valid_uris() {
        assert_endpoint_is_valid_uri(endpoints::ROOT);
        assert_endpoint_is_valid_uri(endpoints::CHILD_VIEW);
        assert_endpoint_is_valid_uri(endpoints::SHOP_VIEW);
        assert_endpoint_is_valid_uri(endpoints::DOLLS_VIEW);
        assert_endpoint_is_valid_uri(endpoints::PARENT_LOG_IN_VIEW);
        assert_endpoint_is_valid_uri(endpoints::PARENT_VIEW);
        assert_endpoint_is_valid_uri(endpoints::INTERNAL_ERROR_VIEW);

        assert_endpoint_is_valid_uri(endpoints::CART_ITEM);
        assert_endpoint_is_valid_uri(endpoints::PURCHASE);
        assert_endpoint_is_valid_uri(endpoints::CHECKOUT);
        assert_endpoint_is_valid_uri(endpoints::SELECT_DOLL);
        assert_endpoint_is_valid_uri(endpoints::PARENT_LOG_IN_API);
        assert_endpoint_is_valid_uri(endpoints::PARENT_LOG_OUT);
        assert_endpoint_is_valid_uri(endpoints::REWARDS_API);
        assert_endpoint_is_valid_uri(endpoints::GOALS_API);
        assert_endpoint_is_valid_uri(endpoints::COMPLETE_GOAL);
    }

    #[test]
    fn produces_valid_uri() {
        let formatted_path = format_endpoint("/hello/{world_id}", 1);

        assert_eq!(formatted_path, "/hello/1");
        assert!(formatted_path.parse::<Uri>().is_ok());

        // Parameter with single word should also work.
        let formatted_path = format_endpoint("/hello/{world}", "abc");

        assert_eq!(formatted_path, "/hello/abc");
        assert!(formatted_path.parse::<Uri>().is_ok());
    }

    #[test]
    fn returns_original_path_with_no_parameter() {
        let formatted_path = format_endpoint("/hello/world", 1);

        assert_eq!(formatted_path, "/hello/world");
        assert!(formatted_path.parse::<Uri>().is_ok());
    }

    #[test]
    fn parameter_in_middle() {
        let formatted_path = format_endpoint(endpoints::COMPLETE_GOAL, 3);

        assert_eq!(formatted_path, "/api/goals/3/complete");
        assert!(formatted_path.parse::<Uri>().is_ok());
    }
}
