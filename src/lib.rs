//! Rust client library for the Yooga Pay back-office.
//!
//! This crate provides typed clients for the Yooga Pay payment APIs and the
//! back-office logic built on top of them: merchant lookup and
//! normalization, bank details editing, PIX fee configuration, weekend
//! payout checks, PIX validation review, staff sessions and role-based
//! navigation.
//!
//! The network layer comes in an async flavour (feature `async`) and a
//! blocking one (feature `blocking`); the pure state types ([`lookup`],
//! [`editor`], [`fees`], [`roles`]) are always available.

pub mod config;
pub mod editor;
pub mod error;
pub mod fees;
pub mod lookup;
pub mod models;
pub mod roles;
pub mod session;

#[cfg(any(feature = "async", feature = "blocking"))]
pub mod auth;
#[cfg(any(feature = "async", feature = "blocking"))]
pub mod back_office;
#[cfg(any(feature = "async", feature = "blocking"))]
pub mod client;
