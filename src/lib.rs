//! moodwatch: a polling client for a customer-emotion analysis backend.
//!
//! The core is [`poller::LivePoller`], which keeps a short chart series in
//! sync with the backend's trend endpoint and drives live monitoring. The
//! terminal (`watch`) and browser (`dashboard`) front ends both sit on it.

pub mod backend;
pub mod channel;
pub mod cli;
pub mod config;
pub mod logging;
pub mod poller;
pub mod render;
pub mod series;
pub mod web;
