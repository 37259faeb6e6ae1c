//! Courier-store grant collaborator.

use std::collections::HashSet;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::{CourierId, StoreId};

use crate::Result;

/// Trait for checking courier-store working relationships.
///
/// A grant is a standing permission for a courier to work a store's
/// orders. Granting and revoking live elsewhere; the order workflow
/// only asks.
#[async_trait]
pub trait GrantDirectory: Send + Sync {
    /// Whether the courier holds a grant for the store.
    async fn has_grant(&self, courier_id: CourierId, store_id: StoreId) -> Result<bool>;
}

/// In-memory grant directory for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryGrantDirectory {
    grants: Arc<RwLock<HashSet<(CourierId, StoreId)>>>,
}

impl InMemoryGrantDirectory {
    /// Creates a new empty in-memory grant directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Grants a courier permission to work the store's orders.
    pub fn grant(&self, courier_id: CourierId, store_id: StoreId) {
        self.grants.write().unwrap().insert((courier_id, store_id));
    }

    /// Revokes a previously given grant.
    pub fn revoke(&self, courier_id: CourierId, store_id: StoreId) {
        self.grants.write().unwrap().remove(&(courier_id, store_id));
    }
}

#[async_trait]
impl GrantDirectory for InMemoryGrantDirectory {
    async fn has_grant(&self, courier_id: CourierId, store_id: StoreId) -> Result<bool> {
        Ok(self.grants.read().unwrap().contains(&(courier_id, store_id)))
    }
}
