pub mod client;

pub use client::{IndexSource, MarketDataClient};
