//! Command implementations for the reqopts CLI

pub mod call;
pub mod config;
pub mod demo;

pub use call::{CallArgs, CliLogin, Session, cmd_call, options_from_args};
pub use config::{cmd_config_path, cmd_config_show};
pub use demo::{cmd_demo, demo_post_options};
