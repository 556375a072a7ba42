//! Session-related types.

/// Session keys.
pub mod keys {
    /// Key under which the visitor's cart is stored.
    pub const CART: &str = "cart";

    /// Key for the token that identifies the current cart contents at
    /// checkout. A new token is issued whenever the cart changes, so
    /// submitting the same cart twice places one order.
    pub const CHECKOUT_TOKEN: &str = "checkout_token";

    /// Key for the ids of orders placed in this session. Only these orders
    /// can be viewed through the confirmation route.
    pub const PLACED_ORDERS: &str = "placed_orders";
}
