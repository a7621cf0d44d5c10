//! warden-http - HTTP implementations of the warden provider and transport traits.

mod client;
mod endpoints;
mod executor;
mod provider;

pub use client::HttpClient;
pub use executor::HttpExecutor;
pub use provider::HttpIdentityProvider;
