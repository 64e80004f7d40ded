pub mod client;
pub mod inventory;
pub mod types;

pub use client::NetBoxClient;
