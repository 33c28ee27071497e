// src/lib.rs

//! Notice bot library
//!
//! Polls a notices page, relays unseen notices to a Telegram chat and
//! answers on-demand notice commands.

pub mod error;
pub mod models;
pub mod pipeline;
#[cfg(feature = "server")]
pub mod server;
pub mod services;
pub mod storage;
pub mod utils;

#[cfg(test)]
pub(crate) mod test_support;
