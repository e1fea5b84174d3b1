#![allow(unused_assignments)] // thiserror/miette proc macros trigger false positives

pub mod check;
pub mod cli;
pub mod config;
pub mod declaration;
pub mod error;
pub mod init;
pub mod libvirt;
pub mod logging;
pub mod paths;
pub mod platform;
pub mod roster;
pub mod skill;
pub mod vagrant;
