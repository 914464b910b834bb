//! # storefront-api: HTTP Service for the Storefront
//!
//! axum service that exposes carts, pricing quotes, shipping estimates and
//! checkout helpers to the front end. Every price it returns comes from
//! `storefront_core::price_order`.
//!
//! ## Module Structure
//! ```text
//! storefront-api/src/
//! ├── main.rs       ◄─── Binary: config, tracing, serve
//! ├── lib.rs        ◄─── You are here (router, tracing setup)
//! ├── config.rs     ◄─── StorefrontConfig (TOML + env)
//! ├── error.rs      ◄─── ApiError → HTTP status + JSON body
//! ├── state/        ◄─── AppState, CartStore, products, coupon redemptions
//! └── routes/       ◄─── Handlers per resource
//! ```

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

use tracing_subscriber::EnvFilter;

pub use config::StorefrontConfig;
pub use error::{ApiError, ErrorCode};
pub use routes::router;
pub use state::AppState;

/// Initializes the tracing subscriber.
///
/// ## Log Levels
/// - Default: `info,storefront_api=debug,tower_http=debug`
/// - Override with `RUST_LOG`
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,storefront_api=debug,tower_http=debug"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}
