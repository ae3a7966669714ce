//! REST client and console orchestration for the shipment backend.
//!
//! This crate pairs the shipment composer from `supplyline-core` with a
//! blocking HTTP client for the backend API, plus a scripted mock for
//! testing flows without a server.

pub mod client;
pub mod console;
pub mod error;
pub mod mock;

pub use client::*;
pub use console::*;
pub use error::*;
pub use mock::*;
