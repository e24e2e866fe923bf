//! Service layer composing the cache and the store.

mod state;

pub use state::StateService;
