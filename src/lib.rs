//! irkit - multi-protocol infrared remote engine.
//!
//! Captures IR waveforms as mark/space pulse pairs, classifies them against a
//! catalogue of consumer protocols (NEC, Samsung, Sony, RC5/6, ... plus a
//! histogram-based universal fallback), stores compact symbolic codes, and
//! re-emits them on demand. Air-conditioner remotes get a stateful model that
//! regenerates the full manufacturer frame whenever any setting changes.
//!
//! The hardware is abstracted: a pulse *source* hands completed
//! [`pulse::PulseBuffer`]s to the [`engine::IrEngine`] through a bounded
//! queue, and a pulse *sink* ([`transmit::PulseSink`]) accepts encoded
//! buffers plus carrier configuration. Everything in between - filtering,
//! multi-frame learn verification, the decoder cascade, the AC frame
//! encoders, and the persistent action store - lives in this crate.

pub mod actions;
pub mod ac;
pub mod catalog;
pub mod code;
pub mod config;
pub mod control;
pub mod engine;
pub mod error;
pub mod learn;
pub mod protocols;
pub mod pulse;
pub mod store;
pub mod transmit;

pub use catalog::Protocol;
pub use code::IrCode;
pub use error::{Error, Result};
pub use pulse::{PulseBuffer, PulsePair};
