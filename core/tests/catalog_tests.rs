// marketplace/core/tests/catalog_tests.rs
mod common;
use common::*;
use marketplace_core::models::ProductUpdate;
use marketplace_core::MarketError;
use uuid::Uuid;

#[tokio::test]
async fn create_binds_the_product_to_the_seller() {
  let market = Market::new();
  let seller = market.seller().await;
  let product = market.product(seller.id, 1999).await;

  assert_eq!(product.seller_id, seller.id);
  assert_eq!(market.catalog.get(product.id).await.unwrap(), product);
  assert_eq!(market.catalog.seller_products(seller.id).await.unwrap(), vec![product]);
}

#[tokio::test]
async fn create_validates_required_fields_and_price() {
  let market = Market::new();
  let seller = market.seller().await;
  let mut input = new_product(-1);
  input.name = " ".to_string();
  input.description = String::new();

  match market.catalog.create(seller.id, input).await {
    Err(MarketError::Validation(fields)) => {
      let names: Vec<&str> = fields.iter().map(|f| f.field.as_str()).collect();
      assert_eq!(names, vec!["name", "description", "price_cents"]);
    }
    other => panic!("expected Validation, got {:?}", other),
  }
}

#[tokio::test]
async fn missing_price_is_required() {
  let market = Market::new();
  let seller = market.seller().await;
  let mut input = new_product(100);
  input.price_cents = None;

  match market.catalog.create(seller.id, input).await {
    Err(MarketError::Validation(fields)) => {
      assert_eq!(fields.len(), 1);
      assert_eq!(fields[0].field, "price_cents");
      assert_eq!(fields[0].reason, "required");
    }
    other => panic!("expected Validation, got {:?}", other),
  }
  assert!(matches!(market.catalog.list().await, Err(MarketError::NotFound(_))));
}

#[tokio::test]
async fn zero_price_is_allowed() {
  let market = Market::new();
  let seller = market.seller().await;
  assert_eq!(market.product(seller.id, 0).await.price_cents, 0);
}

#[tokio::test]
async fn duplicate_sku_conflicts_across_sellers() {
  let market = Market::new();
  let first = market.seller().await;
  let second = market.seller().await;
  let product = market.product(first.id, 100).await;

  let mut input = new_product(200);
  input.sku = product.sku.clone();
  match market.catalog.create(second.id, input).await {
    Err(MarketError::Conflict(message)) => assert_eq!(message, "Product already exists with the same sku"),
    other => panic!("expected Conflict, got {:?}", other),
  }
}

#[tokio::test]
async fn create_for_unknown_seller_is_not_found() {
  let market = Market::new();
  assert!(matches!(
    market.catalog.create(Uuid::new_v4(), new_product(100)).await,
    Err(MarketError::NotFound(_))
  ));
}

#[tokio::test]
async fn update_is_partial_and_owner_only() {
  let market = Market::new();
  let owner = market.seller().await;
  let intruder = market.seller().await;
  let product = market.product(owner.id, 100).await;

  let patch = ProductUpdate {
    price_cents: Some(150),
    ..ProductUpdate::default()
  };
  assert!(matches!(
    market.catalog.update(intruder.id, product.id, patch.clone()).await,
    Err(MarketError::NotFound(_))
  ));

  let updated = market.catalog.update(owner.id, product.id, patch).await.unwrap();
  assert_eq!(updated.price_cents, 150);
  assert_eq!(updated.name, product.name);
  assert_eq!(updated.sku, product.sku);
  assert_eq!(updated.seller_id, owner.id);
}

#[tokio::test]
async fn keeping_own_sku_on_update_is_not_a_conflict() {
  let market = Market::new();
  let seller = market.seller().await;
  let product = market.product(seller.id, 100).await;
  let patch = ProductUpdate {
    sku: Some(product.sku.clone()),
    ..ProductUpdate::default()
  };
  assert!(market.catalog.update(seller.id, product.id, patch).await.is_ok());
}

#[tokio::test]
async fn seller_product_hides_other_sellers_products() {
  let market = Market::new();
  let owner = market.seller().await;
  let other = market.seller().await;
  let product = market.product(owner.id, 100).await;

  assert!(market.catalog.seller_product(owner.id, product.id).await.is_ok());
  assert!(matches!(
    market.catalog.seller_product(other.id, product.id).await,
    Err(MarketError::NotFound(_))
  ));
  assert!(matches!(market.catalog.seller_products(other.id).await, Err(MarketError::NotFound(_))));
}

#[tokio::test]
async fn empty_catalog_is_not_found() {
  let market = Market::new();
  assert!(matches!(market.catalog.list().await, Err(MarketError::NotFound(_))));
}

#[tokio::test]
async fn delete_pulls_the_product_out_of_open_carts() {
  let market = Market::new();
  let seller = market.seller().await;
  let doomed = market.product(seller.id, 300).await;
  let kept = market.product(seller.id, 100).await;
  let customer = market.customer().await;

  market.carts.add_item(customer.id, doomed.id, 2).await.unwrap();
  market.carts.add_item(customer.id, kept.id, 1).await.unwrap();
  assert_eq!(market.carts.view_cart(customer.id).await.unwrap().cart.total_price_cents, 700);

  market.catalog.delete(seller.id, doomed.id).await.unwrap();

  let cart = market.carts.view_cart(customer.id).await.unwrap();
  assert_eq!(cart.items.len(), 1);
  assert_eq!(cart.items[0].product_id, kept.id);
  assert_eq!(cart.cart.total_price_cents, 100);
  assert!(matches!(market.catalog.get(doomed.id).await, Err(MarketError::NotFound(_))));
}

#[tokio::test]
async fn delete_of_an_ordered_product_conflicts() {
  let market = Market::new();
  let seller = market.seller().await;
  let product = market.product(seller.id, 300).await;
  let customer = market.customer().await;
  market.carts.add_item(customer.id, product.id, 1).await.unwrap();
  market.orders.place_order(customer.id, "1 Main St".to_string()).await.unwrap();

  assert!(matches!(
    market.catalog.delete(seller.id, product.id).await,
    Err(MarketError::Conflict(_))
  ));
  assert!(market.catalog.get(product.id).await.is_ok());
}

#[tokio::test]
async fn delete_by_another_seller_is_not_found() {
  let market = Market::new();
  let owner = market.seller().await;
  let other = market.seller().await;
  let product = market.product(owner.id, 300).await;

  assert!(matches!(
    market.catalog.delete(other.id, product.id).await,
    Err(MarketError::NotFound(_))
  ));
}
