//! Integration test crate for deltav.
//!
//! This crate exists solely to hold cross-crate integration tests.
//! It depends on every deltav crate to verify the stages compose.

#[cfg(test)]
mod fidelity;

#[cfg(test)]
mod scenarios;
