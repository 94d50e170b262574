//! The accessory shop: the catalog, the cart, the child's collection and buying.

mod cart;
mod catalog;
mod owned;
mod purchase;
mod shop_page;

pub use cart::Cart;
pub use catalog::{
    Accessory, Category, CategoryFilter, ItemId, SortOrder, catalog, find_accessory, search,
};
pub use owned::OwnedItems;
pub use purchase::{
    CheckoutSummary, InsufficientEggs, PurchaseListener, PurchaseOutcome, Receipt, Shop,
};
pub use shop_page::{
    ShopState, add_to_cart_endpoint, checkout_endpoint, get_shop_page, purchase_endpoint,
};
