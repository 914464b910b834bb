//! # State Module
//!
//! Shared state handed to every axum handler.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                      axum Router                                │   │
//! │  │  Router::new().route(...).with_state(app_state)                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                              │ State<AppState> (cheap clone)            │
//! │          ┌───────────────────┼───────────────────┬──────────────┐      │
//! │          ▼                   ▼                   ▼              ▼      │
//! │  ┌──────────────┐  ┌──────────────────┐  ┌────────────┐ ┌───────────┐ │
//! │  │  CartState   │  │ StorefrontConfig │  │  Product   │ │Redemption │ │
//! │  │              │  │                  │  │  Catalog   │ │ Counter   │ │
//! │  │ Arc<dyn      │  │ Arc (read-only)  │  │ Arc (read- │ │ Arc<Mutex │ │
//! │  │  CartStore>  │  │ pricing catalog  │  │  only)     │ │ <HashMap>>│ │
//! │  └──────────────┘  └──────────────────┘  └────────────┘ └───────────┘ │
//! │                                                                         │
//! │  THREAD SAFETY:                                                        │
//! │  • CartState: store map behind a Mutex, one writer per mutation        │
//! │  • Config and products: read-only after startup                        │
//! │  • RedemptionCounter: check-and-record under one lock                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod cart;
mod products;
mod redemptions;

use std::sync::Arc;

pub use cart::{CartState, CartStore, InMemoryCartStore, StoreError};
pub use products::{Product, ProductCatalog, ProductFilter, ProductSort, ProductVariant};
pub use redemptions::RedemptionCounter;

use crate::config::StorefrontConfig;

/// Everything a handler can reach.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<StorefrontConfig>,
    pub carts: CartState,
    pub products: Arc<ProductCatalog>,
    pub redemptions: Arc<RedemptionCounter>,
}

impl AppState {
    /// Builds state around an injected cart store.
    pub fn new(config: StorefrontConfig, store: Arc<dyn CartStore>) -> Self {
        AppState {
            config: Arc::new(config),
            carts: CartState::new(store),
            products: Arc::new(ProductCatalog::default()),
            redemptions: Arc::new(RedemptionCounter::new()),
        }
    }

    /// State backed by the in-memory cart store.
    pub fn in_memory(config: StorefrontConfig) -> Self {
        Self::new(config, Arc::new(InMemoryCartStore::new()))
    }
}
