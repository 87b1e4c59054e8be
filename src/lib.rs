//! cycle-sync: local cycle prediction and a small support assistant, with Hexagonal Architecture.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod shared;
pub mod usecases;
