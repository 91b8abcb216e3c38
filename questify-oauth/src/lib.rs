pub mod events;
pub mod provider;
pub mod service;

pub use provider::{ProviderConfig, TokenGrant};
pub use service::OAuthService;
