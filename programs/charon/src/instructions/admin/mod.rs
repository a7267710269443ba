//! Controller-only instructions

pub mod change_controller;

pub use change_controller::*;
