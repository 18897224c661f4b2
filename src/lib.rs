//! Chainwire - A Crypto News Aggregation Service
//!
//! This crate aggregates cryptocurrency and finance news from multiple RSS
//! feeds and serves a paginated, filterable feed alongside live market data
//! (asset prices and a sentiment index). Nothing is persisted; every request
//! re-fetches and re-derives its state.

pub mod categorize;
pub mod config;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod markets;
pub mod pipeline;
pub mod routes;
pub mod types;
