pub mod error;
pub mod memory;
pub mod query;
pub mod store;
pub mod supabase;

use std::sync::Arc;

use tracing::info;

use shared_config::{AppConfig, StoreBackend};

pub use error::StoreError;
pub use memory::MemoryStore;
pub use query::{Condition, Query, SortOrder};
pub use store::{Record, RecordStore};
pub use supabase::{SupabaseClient, SupabaseStore};

/// Opens tables on the backend selected by configuration.
pub enum StoreFactory {
    Memory,
    Supabase(Arc<SupabaseClient>),
}

impl StoreFactory {
    pub fn from_config(config: &AppConfig) -> Self {
        match config.store_backend {
            StoreBackend::Memory => {
                info!("Using in-memory record store");
                StoreFactory::Memory
            }
            StoreBackend::Supabase => {
                info!("Using Supabase record store at {}", config.supabase_url);
                StoreFactory::Supabase(Arc::new(SupabaseClient::new(config)))
            }
        }
    }

    pub fn open<R: Record>(&self) -> Arc<dyn RecordStore<R>> {
        match self {
            StoreFactory::Memory => Arc::new(MemoryStore::<R>::new()),
            StoreFactory::Supabase(client) => Arc::new(SupabaseStore::<R>::new(client.clone())),
        }
    }
}
