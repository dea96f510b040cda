//! Homegrown tutoring client core
//!
//! A conversation & workspace session model for the tutoring app: chat
//! transcript, single-flight chat requests, server-driven module progress,
//! and device-local notes. Rendering is left to whatever view layer embeds it.

pub mod backend;
pub mod config;
pub mod navigator;
pub mod runtime;
pub mod session;
pub mod state_machine;
pub mod storage;
pub mod transcript;
pub mod workspace;
