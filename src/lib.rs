//! renderdeck - htop for render farm agents
//!
//! A terminal dashboard that receives director push events and keeps one
//! card per render agent in sync with them.

pub mod config;
pub mod events;
pub mod jobs;
pub mod registry;
pub mod server;
pub mod tui;
pub mod view;
