//! Core business logic - framework-agnostic farm, zone and finance operations.
//!
//! Nothing in here knows about HTTP. The API layer and the tests both call these
//! functions directly.

pub mod farm;
pub mod finance;
pub mod irrigation;
pub mod locks;
pub mod session;
pub mod user;
pub mod weather;
pub mod zones;
