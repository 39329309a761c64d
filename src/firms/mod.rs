//! Client for the NASA FIRMS active fire API.

pub mod client;
pub mod error;

pub use client::{FirmsClient, MapKeyStatus, DEFAULT_FIRMS_BASE_URL};
