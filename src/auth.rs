//! Credential strategies, cached access tokens, and the `Authorization` header builder.

pub mod credentials;
pub mod header;
pub mod token;

pub use credentials::*;
pub use header::*;
pub use token::*;
