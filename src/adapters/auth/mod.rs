//! Auth provider adapters.

mod static_auth;

pub use static_auth::StaticAuthProvider;
