// marketplace/core/tests/cart_tests.rs
mod common;
use common::*;
use marketplace_core::MarketError;
use uuid::Uuid;

#[tokio::test]
async fn adding_the_same_product_twice_merges_into_one_line_item() {
  let market = Market::new();
  let seller = market.seller().await;
  let product = market.product(seller.id, 250).await;
  let customer = market.customer().await;

  let first = market.carts.add_item(customer.id, product.id, 2).await.unwrap();
  let second = market.carts.add_item(customer.id, product.id, 2).await.unwrap();
  assert_eq!(first.id, second.id);

  let cart = market.carts.view_cart(customer.id).await.unwrap();
  assert_eq!(cart.items.len(), 1);
  assert_eq!(cart.items[0].quantity, 4);
  assert_eq!(cart.cart.total_price_cents, 4 * product.price_cents);
}

#[tokio::test]
async fn concurrent_adds_of_one_customer_lose_no_update() {
  let market = Market::new();
  let seller = market.seller().await;
  let product = market.product(seller.id, 100).await;
  let customer = market.customer().await;

  let tasks: Vec<_> = (0..8)
    .map(|_| {
      let carts = market.carts.clone();
      let (customer_id, product_id) = (customer.id, product.id);
      tokio::spawn(async move { carts.add_item(customer_id, product_id, 1).await })
    })
    .collect();
  for task in tasks {
    task.await.unwrap().unwrap();
  }

  let cart = market.carts.view_cart(customer.id).await.unwrap();
  assert_eq!(cart.items[0].quantity, 8);
  assert_eq!(cart.cart.total_price_cents, 800);
}

#[tokio::test]
async fn non_positive_quantity_is_rejected() {
  let market = Market::new();
  let seller = market.seller().await;
  let product = market.product(seller.id, 100).await;
  let customer = market.customer().await;

  for quantity in [0, -3] {
    assert!(matches!(
      market.carts.add_item(customer.id, product.id, quantity).await,
      Err(MarketError::Validation(_))
    ));
  }
  assert!(matches!(market.carts.view_cart(customer.id).await, Err(MarketError::NotFound(_))));
}

#[tokio::test]
async fn unknown_product_is_not_found_and_opens_no_cart() {
  let market = Market::new();
  let customer = market.customer().await;

  assert!(matches!(
    market.carts.add_item(customer.id, Uuid::new_v4(), 1).await,
    Err(MarketError::NotFound(_))
  ));
  assert!(matches!(market.carts.view_cart(customer.id).await, Err(MarketError::NotFound(_))));
}

#[tokio::test]
async fn update_item_overwrites_quantity_and_recomputes_total() {
  let market = Market::new();
  let seller = market.seller().await;
  let cheap = market.product(seller.id, 100).await;
  let dear = market.product(seller.id, 1000).await;
  let customer = market.customer().await;

  let item = market.carts.add_item(customer.id, cheap.id, 3).await.unwrap();
  market.carts.add_item(customer.id, dear.id, 1).await.unwrap();

  let updated = market.carts.update_item(customer.id, item.id, 1).await.unwrap();
  assert_eq!(updated.quantity, 1);
  assert_eq!(market.carts.view_cart(customer.id).await.unwrap().cart.total_price_cents, 1100);
}

#[tokio::test]
async fn remove_item_deletes_the_line_and_recomputes_total() {
  let market = Market::new();
  let seller = market.seller().await;
  let product = market.product(seller.id, 400).await;
  let customer = market.customer().await;

  let item = market.carts.add_item(customer.id, product.id, 2).await.unwrap();
  market.carts.remove_item(customer.id, item.id).await.unwrap();

  let cart = market.carts.view_cart(customer.id).await.unwrap();
  assert!(cart.items.is_empty());
  assert_eq!(cart.cart.total_price_cents, 0);
  assert!(matches!(
    market.carts.remove_item(customer.id, item.id).await,
    Err(MarketError::NotFound(_))
  ));
}

#[tokio::test]
async fn another_customers_line_item_cannot_be_touched() {
  let market = Market::new();
  let seller = market.seller().await;
  let product = market.product(seller.id, 500).await;
  let owner = market.customer().await;
  let intruder = market.customer().await;

  let item = market.carts.add_item(owner.id, product.id, 2).await.unwrap();
  // The intruder has an active cart of their own.
  market.carts.add_item(intruder.id, product.id, 1).await.unwrap();

  assert!(matches!(
    market.carts.update_item(intruder.id, item.id, 9).await,
    Err(MarketError::NotFound(_))
  ));
  assert!(matches!(
    market.carts.remove_item(intruder.id, item.id).await,
    Err(MarketError::NotFound(_))
  ));

  let owner_cart = market.carts.view_cart(owner.id).await.unwrap();
  assert_eq!(owner_cart.items[0].quantity, 2);
  assert_eq!(owner_cart.cart.total_price_cents, 1000);
  assert_eq!(market.carts.view_cart(intruder.id).await.unwrap().cart.total_price_cents, 500);
}

#[tokio::test]
async fn update_without_active_cart_is_not_found() {
  let market = Market::new();
  let customer = market.customer().await;
  assert!(matches!(
    market.carts.update_item(customer.id, Uuid::new_v4(), 1).await,
    Err(MarketError::NotFound(_))
  ));
}
