// Adapters layer: concrete implementations of the domain ports (document store, auth, local files).

pub mod auth;
pub mod fallback;
pub mod local;
pub mod remote;
