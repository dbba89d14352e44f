use clap::{ArgAction, Parser, Subcommand};

use crate::options::HttpMethod;

#[derive(Parser)]
#[command(name = "reqopts")]
#[command(about = "Issue authenticated HTTP requests built from optional parameters")]
#[command(version)]
pub struct Cli {
    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Send one authenticated request and print the response
    Call {
        /// Target URL
        url: String,

        /// HTTP method (GET, POST, PUT, PATCH, DELETE, HEAD, OPTIONS)
        #[arg(short = 'X', long, default_value = "GET")]
        method: HttpMethod,

        /// Query parameter as KEY=VALUE (repeatable)
        #[arg(short, long = "query", value_parser = parse_key_value)]
        query: Vec<(String, String)>,

        /// Request body
        #[arg(short, long, conflicts_with = "data_file")]
        data: Option<String>,

        /// Read the request body from a file
        #[arg(long)]
        data_file: Option<String>,

        /// Accept header
        #[arg(long)]
        accept: Option<String>,

        /// Skip login and send an invalid bearer token
        #[arg(long)]
        invalid_token: bool,

        #[command(flatten)]
        auth: AuthArgs,
    },

    /// Run the two sample calls (defaults, then POST with query) and ignore the results
    Demo {
        /// Target URL
        url: String,

        #[command(flatten)]
        auth: AuthArgs,
    },

    /// Show configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

/// Credentials and login endpoint shared by request commands
#[derive(clap::Args, Debug, Clone, Default)]
pub struct AuthArgs {
    /// Identity (email) used to log in
    #[arg(long)]
    pub identity: Option<String>,

    /// Secret used to log in (defaults to $REQOPTS_SECRET)
    #[arg(long)]
    pub secret: Option<String>,

    /// Login endpoint returning {"token": "..."}
    #[arg(long)]
    pub login_url: Option<String>,

    /// Use this bearer token instead of logging in
    #[arg(long, conflicts_with = "login_url")]
    pub token: Option<String>,

    /// Overall deadline in seconds, 0 for none
    #[arg(long)]
    pub timeout: Option<u64>,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the effective configuration
    Show,
    /// Print the config file location
    Path,
}

/// Parse a KEY=VALUE pair
pub fn parse_key_value(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got '{}'", s)),
    }
}
