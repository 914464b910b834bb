//! # Cart State
//!
//! Cart persistence behind the [`CartStore`] port, plus [`CartState`]
//! which runs load → mutate → save for handlers.
//!
//! ## Snapshot Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Mutation                                        │
//! │                                                                         │
//! │  Handler ──► CartState::with_cart_mut(id, |cart| ...)                  │
//! │                 │                                                       │
//! │                 ├── 1. lock writer                                     │
//! │                 ├── 2. store.load(id)  ──► JSON snapshot → Cart        │
//! │                 │       (unreadable snapshot → empty cart + warn!)     │
//! │                 ├── 3. f(&mut cart)    ──► Err? nothing is saved       │
//! │                 └── 4. store.save(&cart) ─► Cart → JSON snapshot       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use storefront_core::Cart;
use thiserror::Error;
use tracing::warn;
use uuid::Uuid;

/// Cart persistence failures.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to serialize cart: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Where carts live between requests.
pub trait CartStore: Send + Sync {
    /// Returns the cart, or `None` if the id is unknown.
    fn load(&self, id: Uuid) -> Option<Cart>;

    /// Inserts or replaces the cart.
    fn save(&self, cart: &Cart) -> Result<(), StoreError>;
}

// =============================================================================
// In-Memory Store
// =============================================================================

/// Keeps carts as JSON snapshots in a map.
#[derive(Debug, Default)]
pub struct InMemoryCartStore {
    snapshots: Mutex<HashMap<Uuid, String>>,
}

impl InMemoryCartStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a raw snapshot as-is.
    pub fn insert_raw(&self, id: Uuid, snapshot: impl Into<String>) {
        self.snapshots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, snapshot.into());
    }
}

impl CartStore for InMemoryCartStore {
    fn load(&self, id: Uuid) -> Option<Cart> {
        let snapshot = self
            .snapshots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .cloned()?;

        match serde_json::from_str::<Cart>(&snapshot) {
            Ok(mut cart) => {
                cart.id = id;
                Some(cart)
            }
            Err(e) => {
                warn!(cart_id = %id, error = %e, "Unreadable cart snapshot, starting empty");
                Some(Cart::new(id))
            }
        }
    }

    fn save(&self, cart: &Cart) -> Result<(), StoreError> {
        let snapshot = serde_json::to_string(cart)?;
        self.snapshots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(cart.id, snapshot);
        Ok(())
    }
}

// =============================================================================
// Cart State
// =============================================================================

/// Handler-facing wrapper over a [`CartStore`].
///
/// Mutations are serialized so two requests on the same cart cannot
/// overwrite each other's changes.
#[derive(Clone)]
pub struct CartState {
    store: Arc<dyn CartStore>,
    writer: Arc<Mutex<()>>,
}

impl CartState {
    pub fn new(store: Arc<dyn CartStore>) -> Self {
        CartState {
            store,
            writer: Arc::new(Mutex::new(())),
        }
    }

    /// Creates and saves an empty cart with a fresh id.
    pub fn create(&self) -> Result<Cart, StoreError> {
        let cart = Cart::new(Uuid::new_v4());
        self.store.save(&cart)?;
        Ok(cart)
    }

    /// Executes a function with read access to a cart.
    ///
    /// Returns `None` if the cart does not exist.
    pub fn with_cart<F, R>(&self, id: Uuid, f: F) -> Option<R>
    where
        F: FnOnce(&Cart) -> R,
    {
        self.store.load(id).map(|cart| f(&cart))
    }

    /// Executes a function with write access to a cart and saves the result.
    ///
    /// The cart is saved only when `f` succeeds. Returns `Ok(None)` if the
    /// cart does not exist.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// carts.with_cart_mut(id, |cart| cart.add_item(item).map_err(ApiError::from))?;
    /// ```
    pub fn with_cart_mut<F, R, E>(&self, id: Uuid, f: F) -> Result<Option<R>, E>
    where
        F: FnOnce(&mut Cart) -> Result<R, E>,
        E: From<StoreError>,
    {
        let _guard = self.writer.lock().unwrap_or_else(PoisonError::into_inner);

        let Some(mut cart) = self.store.load(id) else {
            return Ok(None);
        };
        let result = f(&mut cart)?;
        self.store.save(&cart)?;
        Ok(Some(result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ApiError, ErrorCode};
    use storefront_core::{LineItem, Money};

    fn state() -> (Arc<InMemoryCartStore>, CartState) {
        let store = Arc::new(InMemoryCartStore::new());
        let state = CartState::new(store.clone());
        (store, state)
    }

    #[test]
    fn test_create_and_load() {
        let (_, carts) = state();
        let cart = carts.create().unwrap();

        let loaded = carts.with_cart(cart.id, |c| c.clone()).unwrap();
        assert_eq!(loaded, cart);
        assert!(carts.with_cart(Uuid::new_v4(), |_| ()).is_none());
    }

    #[test]
    fn test_mutation_is_saved() {
        let (_, carts) = state();
        let id = carts.create().unwrap().id;

        carts
            .with_cart_mut(id, |cart| {
                cart.add_item(LineItem::new("1", Money::from_cents(8999), 2))
                    .map_err(ApiError::from)
            })
            .unwrap();

        let count = carts.with_cart(id, |c| c.item_count()).unwrap();
        assert_eq!(count, 2);
    }

    #[test]
    fn test_failed_mutation_is_not_saved() {
        let (_, carts) = state();
        let id = carts.create().unwrap().id;

        let result: Result<Option<()>, ApiError> = carts.with_cart_mut(id, |cart| {
            cart.add_item(LineItem::new("1", Money::from_cents(100), 1))?;
            cart.update_quantity("missing", None, 3)?;
            Ok(())
        });
        assert_eq!(result.unwrap_err().code, ErrorCode::NotFound);

        // The add before the failure is rolled back as well
        assert!(carts.with_cart(id, |c| c.is_empty()).unwrap());
    }

    #[test]
    fn test_missing_cart_mutation() {
        let (_, carts) = state();
        let result: Result<Option<()>, ApiError> =
            carts.with_cart_mut(Uuid::new_v4(), |_| Ok(()));
        assert!(matches!(result, Ok(None)));
    }

    #[test]
    fn test_unreadable_snapshot_is_empty_cart() {
        let (store, carts) = state();
        let id = Uuid::new_v4();
        store.insert_raw(id, "{not json");

        let cart = carts.with_cart(id, |c| c.clone()).unwrap();
        assert_eq!(cart.id, id);
        assert!(cart.is_empty());
    }
}
