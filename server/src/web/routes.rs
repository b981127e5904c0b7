// marketplace/server/src/web/routes.rs

use actix_web::{error, web, HttpRequest};
use marketplace_core::Role;

use crate::errors::AppError;
use crate::web::handlers::{
  account_handlers, auth_handlers, cart_handlers, order_handlers, payment_handlers, product_handlers,
};

// Malformed bodies and path parameters answer 400 in the usual envelope.
fn json_error(err: error::JsonPayloadError, _req: &HttpRequest) -> error::Error {
  AppError::BadRequest(format!("Invalid request body: {}", err)).into()
}

fn path_error(err: error::PathError, _req: &HttpRequest) -> error::Error {
  AppError::BadRequest(format!("Invalid path parameter: {}", err)).into()
}

/// Mounts the common routes plus the scope of the role this process serves.
pub fn configure_app_routes(cfg: &mut web::ServiceConfig, role: Role) {
  cfg
    .app_data(web::JsonConfig::default().error_handler(json_error))
    .app_data(web::PathConfig::default().error_handler(path_error))
    .route("/api/health", web::get().to(auth_handlers::health_check_handler))
    .route("/api/login", web::post().to(auth_handlers::login_handler));

  match role {
    Role::Customer => configure_customer_routes(cfg),
    Role::Seller => configure_seller_routes(cfg),
    Role::Admin => configure_admin_routes(cfg),
  }
}

fn configure_customer_routes(cfg: &mut web::ServiceConfig) {
  cfg.service(
    web::scope("/api/customers")
      .route("", web::post().to(account_handlers::register_customer_handler))
      .service(
        web::resource("/profile")
          .route(web::get().to(account_handlers::get_profile_handler))
          .route(web::patch().to(account_handlers::update_profile_handler)),
      )
      .route("/products", web::get().to(product_handlers::list_products_handler))
      .route("/products/{product_id}", web::get().to(product_handlers::get_product_handler))
      .service(
        web::resource("/cart")
          .route(web::get().to(cart_handlers::view_cart_handler))
          .route(web::post().to(cart_handlers::add_to_cart_handler)),
      )
      .service(
        web::resource("/cart/cart-items/{cart_item_id}")
          .route(web::patch().to(cart_handlers::update_cart_item_handler))
          .route(web::delete().to(cart_handlers::remove_cart_item_handler)),
      )
      .service(
        web::resource("/orders")
          .route(web::post().to(order_handlers::place_order_handler))
          .route(web::get().to(order_handlers::customer_orders_handler)),
      )
      .route("/orders/{order_id}", web::get().to(order_handlers::customer_order_handler)),
  );
}

fn configure_seller_routes(cfg: &mut web::ServiceConfig) {
  cfg.service(
    web::scope("/api/sellers")
      .route("", web::post().to(account_handlers::register_seller_handler))
      .service(
        web::resource("/profile")
          .route(web::get().to(account_handlers::get_profile_handler))
          .route(web::patch().to(account_handlers::update_profile_handler)),
      )
      .service(
        web::resource("/products")
          .route(web::post().to(product_handlers::create_product_handler))
          .route(web::get().to(product_handlers::seller_products_handler)),
      )
      .service(
        web::resource("/products/{product_id}")
          .route(web::get().to(product_handlers::seller_product_handler))
          .route(web::patch().to(product_handlers::update_product_handler))
          .route(web::delete().to(product_handlers::delete_product_handler)),
      )
      .route("/orders", web::get().to(order_handlers::seller_orders_handler))
      .service(
        web::resource("/orders/{order_id}")
          .route(web::get().to(order_handlers::seller_order_handler))
          .route(web::delete().to(order_handlers::delete_order_handler)),
      )
      // Registered before the item route so the literal segment wins.
      .route(
        "/orders/{order_id}/shipping_info",
        web::get().to(order_handlers::seller_shipping_info_handler),
      )
      .route(
        "/orders/{order_id}/{item_id}",
        web::patch().to(order_handlers::update_line_item_status_handler),
      ),
  );
}

fn configure_admin_routes(cfg: &mut web::ServiceConfig) {
  cfg.service(
    web::scope("/api/admins")
      .service(
        web::resource("")
          .route(web::post().to(account_handlers::register_admin_handler))
          .route(web::get().to(account_handlers::get_profile_handler))
          .route(web::patch().to(account_handlers::update_profile_handler)),
      )
      .route("/customers", web::get().to(account_handlers::list_customers_handler))
      .service(
        web::resource("/customers/{customer_id}")
          .route(web::get().to(account_handlers::get_customer_handler))
          .route(web::patch().to(account_handlers::update_customer_handler))
          .route(web::delete().to(account_handlers::delete_customer_handler)),
      )
      .route("/sellers", web::get().to(account_handlers::list_sellers_handler))
      .service(
        web::resource("/sellers/{seller_id}")
          .route(web::get().to(account_handlers::get_seller_handler))
          .route(web::patch().to(account_handlers::update_seller_handler))
          .route(web::delete().to(account_handlers::delete_seller_handler)),
      )
      .route("/products", web::get().to(product_handlers::list_products_handler))
      .route("/products/{product_id}", web::get().to(product_handlers::get_product_handler))
      .route("/orders", web::get().to(payment_handlers::all_orders_handler))
      .route("/orders/{order_id}", web::get().to(payment_handlers::order_handler))
      .route(
        "/orders/{order_id}/shipping_info",
        web::get().to(payment_handlers::shipping_info_handler),
      )
      .service(
        web::resource("/orders/{order_id}/payment")
          .route(web::get().to(payment_handlers::payment_handler))
          .route(web::patch().to(payment_handlers::update_payment_status_handler)),
      ),
  );
}
