/// Caller identity extraction from the identity provider's headers
pub mod auth;
/// Error to HTTP response mapping
pub mod error_handling;
