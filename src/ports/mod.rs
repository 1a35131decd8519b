//! Ports - the contracts between the booking core and the outside world.

mod auth_provider;
mod document_store;

pub use auth_provider::{AuthProvider, AuthenticatedMember};
pub use document_store::{
    compare_values, Direction, Document, DocumentStore, DocumentTransaction, Filter, Query,
    StoreError, Subscription,
};
