pub mod cli;
pub mod commands;
pub mod config;
pub mod context;
pub mod error;
pub mod executor;
pub mod http;
pub mod login;
pub mod options;
pub mod transport;

pub use cli::{AuthArgs, Cli, Commands, ConfigCommands};
pub use commands::{cmd_call, cmd_config_path, cmd_config_show, cmd_demo};
pub use config::ReqoptsConfig;
pub use context::{CancelHandle, RequestContext};
pub use error::RequestError;
pub use executor::{CONTENT_TYPE_JSON, Executor, INVALID_TOKEN, build_request};
pub use login::{HttpLogin, LoginApi, LoginResponse, StaticToken};
pub use options::{
    DEFAULT_ACCEPT, HttpMethod, ReqOption, RequestBody, RequestOptions, with_accept_header,
    with_body, with_method, with_query_params, with_two_values, with_use_invalid_token,
};
pub use transport::{Transport, UreqTransport};
