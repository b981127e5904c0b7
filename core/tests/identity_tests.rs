// marketplace/core/tests/identity_tests.rs
mod common;
use common::*;
use marketplace_core::models::{AccountUpdate, Profile};
use marketplace_core::{MarketError, Role};
use uuid::Uuid;

#[tokio::test]
async fn register_then_authenticate() {
  let market = Market::new();
  let account = market.customer().await;

  assert_ne!(account.password_hash, PASSWORD);
  let resolved = market
    .identity
    .authenticate(Role::Customer, &account.email, PASSWORD)
    .await
    .unwrap();
  assert_eq!(resolved.id, account.id);
}

#[tokio::test]
async fn unknown_email_and_wrong_password_look_the_same() {
  let market = Market::new();
  let account = market.customer().await;

  let wrong_password = market
    .identity
    .authenticate(Role::Customer, &account.email, "not-the-password")
    .await
    .unwrap_err();
  let unknown_email = market
    .identity
    .authenticate(Role::Customer, "nobody@example.com", PASSWORD)
    .await
    .unwrap_err();

  match (wrong_password, unknown_email) {
    (MarketError::Unauthenticated(a), MarketError::Unauthenticated(b)) => assert_eq!(a, b),
    other => panic!("expected two Unauthenticated errors, got {:?}", other),
  }
}

#[tokio::test]
async fn login_only_consults_the_requested_role() {
  let market = Market::new();
  let seller = market.seller().await;
  let result = market.identity.authenticate(Role::Customer, &seller.email, PASSWORD).await;
  assert!(matches!(result, Err(MarketError::Unauthenticated(_))));
}

#[tokio::test]
async fn registration_reports_every_invalid_field() {
  let market = Market::new();
  let mut input = new_account(Profile::Customer { address: String::new() });
  input.email = "not-an-email".to_string();
  input.password = "123".to_string();

  match market.identity.register(input).await {
    Err(MarketError::Validation(fields)) => {
      let names: Vec<&str> = fields.iter().map(|f| f.field.as_str()).collect();
      assert_eq!(names, vec!["email", "password", "address"]);
    }
    other => panic!("expected Validation, got {:?}", other),
  }
}

#[tokio::test]
async fn concurrent_registration_with_same_email_admits_exactly_one() {
  let market = Market::new();
  let first = new_account(Profile::Customer { address: "1 Main St".to_string() });
  let mut second = new_account(Profile::Customer { address: "2 Main St".to_string() });
  second.email = first.email.clone();

  let (a, b) = tokio::join!(market.identity.register(first), market.identity.register(second));
  let outcomes = [a, b];

  assert_eq!(outcomes.iter().filter(|r| r.is_ok()).count(), 1);
  let conflict = outcomes.into_iter().find_map(|r| r.err()).unwrap();
  match conflict {
    MarketError::Conflict(message) => assert_eq!(message, "Customer already exists with the same email"),
    other => panic!("expected Conflict, got {:?}", other),
  }
}

#[tokio::test]
async fn same_email_is_allowed_across_roles() {
  let market = Market::new();
  let customer = market.customer().await;
  let mut seller = new_account(Profile::Seller { store_name: "Shop".to_string() });
  seller.email = customer.email.clone();
  assert!(market.identity.register(seller).await.is_ok());
}

#[tokio::test]
async fn duplicate_admin_username_conflicts() {
  let market = Market::new();
  let profile = Profile::Admin { username: "root".to_string() };
  market.identity.register(new_account(profile.clone())).await.unwrap();

  match market.identity.register(new_account(profile)).await {
    Err(MarketError::Conflict(message)) => assert_eq!(message, "Admin already exists with the same username"),
    other => panic!("expected Conflict, got {:?}", other),
  }
}

#[tokio::test]
async fn partial_update_changes_only_present_fields() {
  let market = Market::new();
  let account = market.customer().await;

  let updated = market
    .identity
    .update(
      Role::Customer,
      account.id,
      AccountUpdate {
        name: Some("Renamed".to_string()),
        detail: Some("9 Elm St".to_string()),
        ..AccountUpdate::default()
      },
    )
    .await
    .unwrap();

  assert_eq!(updated.name, "Renamed");
  assert_eq!(updated.profile, Profile::Customer { address: "9 Elm St".to_string() });
  assert_eq!(updated.email, account.email);
  assert_eq!(updated.phone, account.phone);
  assert_eq!(updated.password_hash, account.password_hash);
}

#[tokio::test]
async fn update_to_own_email_is_not_a_conflict_but_to_anothers_is() {
  let market = Market::new();
  let account = market.customer().await;
  let other = market.customer().await;

  let same = AccountUpdate {
    email: Some(account.email.clone()),
    ..AccountUpdate::default()
  };
  assert!(market.identity.update(Role::Customer, account.id, same).await.is_ok());

  let taken = AccountUpdate {
    email: Some(other.email.clone()),
    ..AccountUpdate::default()
  };
  assert!(matches!(
    market.identity.update(Role::Customer, account.id, taken).await,
    Err(MarketError::Conflict(_))
  ));
}

#[tokio::test]
async fn present_but_empty_field_is_rejected() {
  let market = Market::new();
  let account = market.customer().await;
  let update = AccountUpdate {
    name: Some(String::new()),
    ..AccountUpdate::default()
  };
  assert!(matches!(
    market.identity.update(Role::Customer, account.id, update).await,
    Err(MarketError::Validation(_))
  ));
}

#[tokio::test]
async fn password_update_takes_effect_for_login() {
  let market = Market::new();
  let account = market.customer().await;
  let update = AccountUpdate {
    password: Some("brand-new-pass".to_string()),
    ..AccountUpdate::default()
  };
  market.identity.update(Role::Customer, account.id, update).await.unwrap();

  assert!(market.identity.authenticate(Role::Customer, &account.email, PASSWORD).await.is_err());
  assert!(market
    .identity
    .authenticate(Role::Customer, &account.email, "brand-new-pass")
    .await
    .is_ok());
}

#[tokio::test]
async fn listing_an_empty_role_is_not_found() {
  let market = Market::new();
  assert!(matches!(market.identity.list(Role::Seller).await, Err(MarketError::NotFound(_))));
  market.seller().await;
  assert_eq!(market.identity.list(Role::Seller).await.unwrap().len(), 1);
}

#[tokio::test]
async fn deleting_a_customer_removes_carts_and_orders() {
  let market = Market::new();
  let seller = market.seller().await;
  let product = market.product(seller.id, 500).await;
  let customer = market.customer().await;

  market.carts.add_item(customer.id, product.id, 1).await.unwrap();
  let order = market.orders.place_order(customer.id, "1 Main St".to_string()).await.unwrap();
  market.carts.add_item(customer.id, product.id, 2).await.unwrap();

  market.identity.delete(Role::Customer, customer.id).await.unwrap();

  assert!(matches!(market.identity.get(Role::Customer, customer.id).await, Err(MarketError::NotFound(_))));
  assert!(matches!(market.orders.order(order.order.id).await, Err(MarketError::NotFound(_))));
  let mut tx = market.store.begin().await.unwrap();
  assert!(tx.list_carts_for_customer(customer.id).await.unwrap().is_empty());
  assert!(tx.list_cart_items_for_product(product.id).await.unwrap().is_empty());
  assert!(tx.find_payment_for_order(order.order.id).await.unwrap().is_none());
}

#[tokio::test]
async fn deleting_a_seller_removes_unordered_products() {
  let market = Market::new();
  let seller = market.seller().await;
  let product = market.product(seller.id, 250).await;

  market.identity.delete(Role::Seller, seller.id).await.unwrap();

  assert!(matches!(market.catalog.get(product.id).await, Err(MarketError::NotFound(_))));
}

#[tokio::test]
async fn deleting_a_seller_with_sold_products_conflicts_and_changes_nothing() {
  let market = Market::new();
  let seller = market.seller().await;
  let product = market.product(seller.id, 250).await;
  let customer = market.customer().await;
  market.carts.add_item(customer.id, product.id, 1).await.unwrap();
  market.orders.place_order(customer.id, "1 Main St".to_string()).await.unwrap();

  assert!(matches!(
    market.identity.delete(Role::Seller, seller.id).await,
    Err(MarketError::Conflict(_))
  ));
  assert!(market.identity.get(Role::Seller, seller.id).await.is_ok());
  assert!(market.catalog.get(product.id).await.is_ok());
}

#[tokio::test]
async fn deleting_an_unknown_account_is_not_found() {
  let market = Market::new();
  assert!(matches!(
    market.identity.delete(Role::Admin, Uuid::new_v4()).await,
    Err(MarketError::NotFound(_))
  ));
}
