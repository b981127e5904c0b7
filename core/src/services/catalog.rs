// marketplace/core/src/services/catalog.rs

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::Utc;
use tracing::{info, instrument};
use uuid::Uuid;

use super::cart::refresh_cart_total;
use crate::auth::Role;
use crate::error::{MarketError, MarketResult};
use crate::models::{NewProduct, Product, ProductUpdate};
use crate::store::{Store, StoreTx};
use crate::validation::FieldErrors;

const PRODUCT_NOT_FOUND: &str = "Product not found";

/// Products owned by sellers. Only the owning seller may change a product;
/// anyone else is told it does not exist.
#[derive(Clone)]
pub struct CatalogService {
  store: Arc<dyn Store>,
}

impl CatalogService {
  pub fn new(store: Arc<dyn Store>) -> Self {
    Self { store }
  }

  #[instrument(name = "catalog::create", skip(self, input), fields(seller_id = %seller_id, sku = %input.sku))]
  pub async fn create(&self, seller_id: Uuid, input: NewProduct) -> MarketResult<Product> {
    let mut errors = FieldErrors::new();
    errors.required("name", &input.name);
    errors.required("sku", &input.sku);
    errors.required("description", &input.description);
    let price_cents = match errors.present("price_cents", input.price_cents) {
      Some(price_cents) => {
        errors.non_negative("price_cents", price_cents);
        price_cents
      }
      None => 0,
    };
    errors.into_result()?;

    let now = Utc::now();
    let product = Product {
      id: Uuid::new_v4(),
      seller_id,
      name: input.name,
      sku: input.sku,
      description: input.description,
      price_cents,
      created_at: now,
      updated_at: now,
    };

    let mut tx = self.store.begin().await?;
    if !tx.lock_account(Role::Seller, seller_id).await? {
      return Err(MarketError::not_found("Seller not found"));
    }
    tx.insert_product(&product).await?;
    tx.commit().await?;

    info!(product_id = %product.id, "Product created.");
    Ok(product)
  }

  #[instrument(name = "catalog::update", skip(self, update), fields(seller_id = %seller_id, product_id = %product_id))]
  pub async fn update(&self, seller_id: Uuid, product_id: Uuid, update: ProductUpdate) -> MarketResult<Product> {
    let mut errors = FieldErrors::new();
    if let Some(name) = &update.name {
      errors.required("name", name);
    }
    if let Some(sku) = &update.sku {
      errors.required("sku", sku);
    }
    if let Some(description) = &update.description {
      errors.required("description", description);
    }
    if let Some(price_cents) = update.price_cents {
      errors.non_negative("price_cents", price_cents);
    }
    errors.into_result()?;

    let mut tx = self.store.begin().await?;
    let mut product = owned_product(tx.as_mut(), seller_id, product_id).await?;

    if let Some(name) = update.name {
      product.name = name;
    }
    if let Some(sku) = update.sku {
      product.sku = sku;
    }
    if let Some(description) = update.description {
      product.description = description;
    }
    if let Some(price_cents) = update.price_cents {
      product.price_cents = price_cents;
    }
    product.updated_at = Utc::now();

    tx.update_product(&product).await?;
    tx.commit().await?;

    info!("Product updated.");
    Ok(product)
  }

  #[instrument(name = "catalog::delete", skip(self), fields(seller_id = %seller_id, product_id = %product_id))]
  pub async fn delete(&self, seller_id: Uuid, product_id: Uuid) -> MarketResult<()> {
    let mut tx = self.store.begin().await?;
    let product = owned_product(tx.as_mut(), seller_id, product_id).await?;
    remove_product(tx.as_mut(), &product).await?;
    tx.commit().await?;

    info!("Product deleted.");
    Ok(())
  }

  pub async fn get(&self, product_id: Uuid) -> MarketResult<Product> {
    let mut tx = self.store.begin().await?;
    let product = tx.find_product(product_id).await?;
    product.ok_or_else(|| MarketError::not_found(PRODUCT_NOT_FOUND))
  }

  pub async fn list(&self) -> MarketResult<Vec<Product>> {
    let mut tx = self.store.begin().await?;
    let products = tx.list_products().await?;
    if products.is_empty() {
      return Err(MarketError::not_found("No products found"));
    }
    Ok(products)
  }

  pub async fn seller_products(&self, seller_id: Uuid) -> MarketResult<Vec<Product>> {
    let mut tx = self.store.begin().await?;
    let products = tx.list_products_by_seller(seller_id).await?;
    if products.is_empty() {
      return Err(MarketError::not_found("No products found for this seller"));
    }
    Ok(products)
  }

  pub async fn seller_product(&self, seller_id: Uuid, product_id: Uuid) -> MarketResult<Product> {
    let mut tx = self.store.begin().await?;
    owned_product(tx.as_mut(), seller_id, product_id).await
  }
}

async fn owned_product(tx: &mut dyn StoreTx, seller_id: Uuid, product_id: Uuid) -> MarketResult<Product> {
  match tx.find_product(product_id).await? {
    Some(product) if product.seller_id == seller_id => Ok(product),
    _ => Err(MarketError::not_found(PRODUCT_NOT_FOUND)),
  }
}

/// Takes the product out of every open cart (recomputing those totals) and
/// deletes it. Refused while any placed order still contains it.
///
/// Every customer holding the product in a cart is row-locked before the
/// order check, so none of those carts can be ordered until this commits.
pub(crate) async fn remove_product(tx: &mut dyn StoreTx, product: &Product) -> MarketResult<()> {
  let mut locked: BTreeSet<Uuid> = BTreeSet::new();
  let items = loop {
    let items = tx.list_cart_items_for_product(product.id).await?;
    let mut owners = BTreeSet::new();
    for item in &items {
      if let Some(cart) = tx.find_cart(item.cart_id).await? {
        if !locked.contains(&cart.customer_id) {
          owners.insert(cart.customer_id);
        }
      }
    }
    if owners.is_empty() {
      break items;
    }
    // Ascending customer id order.
    for customer_id in owners {
      tx.lock_account(Role::Customer, customer_id).await?;
      locked.insert(customer_id);
    }
  };

  for item in &items {
    if tx.find_order_for_cart(item.cart_id).await?.is_some() {
      return Err(MarketError::conflict(format!(
        "Product {} is part of a placed order and cannot be deleted",
        product.sku
      )));
    }
  }

  for item in items {
    tx.delete_cart_item(item.id).await?;
    if let Some(mut cart) = tx.find_cart(item.cart_id).await? {
      refresh_cart_total(tx, &mut cart).await?;
    }
  }
  tx.delete_product(product.id).await?;
  Ok(())
}
