//! Curve Sniper - Pump.fun bonding-curve trading bot library
//!
//! Buys freshly launched pump.fun tokens, watches acquired positions, and
//! sells a configured fraction once a price target is reached.
//!
//! # Modules
//!
//! - `domain`: Core business logic (pricing, curve state, trades, positions)
//! - `ports`: Trait abstractions (ChainReader, TradePort) and test mocks
//! - `adapters`: External implementations (Solana RPC, pump.fun, relays, CLI)
//! - `application`: Orchestration (builder, router, executor, monitor, sniper)
//! - `config`: Configuration loading and validation

pub mod domain;
pub mod ports;
pub mod adapters;
pub mod application;
pub mod config;
