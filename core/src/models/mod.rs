// marketplace/core/src/models/mod.rs

//! Records persisted by the store and the inputs that create or patch them.

pub mod account;
pub mod cart;
pub mod order;
pub mod product;

pub use account::{Account, AccountUpdate, NewAccount, Profile};
pub use cart::{Cart, CartDetails, CartItem};
pub use order::{FulfillmentStatus, Order, OrderDetails, Payment, ShippingInfo, UnknownStatus};
pub use product::{NewProduct, Product, ProductUpdate};
