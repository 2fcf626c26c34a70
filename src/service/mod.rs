//! Service layer: relay orchestration.
//!
//! [`RelayService`] coordinates connection lifecycle, audio fan-out,
//! control handling, and liveness sweeps over the
//! [`super::domain::ConnectionRegistry`].

pub mod relay;

pub use relay::RelayService;
