//! Browse object images of a cluster-organized image store and pair each one
//! with the camera image it was cut from.

pub mod cli;
pub mod command;
pub mod config;
pub mod naming;
pub mod services;
pub mod state;
pub mod view;
