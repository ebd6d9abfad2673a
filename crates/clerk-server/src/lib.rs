//! HTTP front door for build clerk: webhook routes, CLI configuration and
//! service wiring.

pub mod bootstrap;
pub mod cli_args;
pub mod runtime;
pub mod server;
pub mod slack_signature;

pub use bootstrap::init_tracing;
pub use cli_args::{Cli, CliRemedialFailurePolicy};
pub use runtime::{build_server_state, run};
pub use server::{build_clerk_router, serve, ClerkServerState};
pub use slack_signature::SlackSigningConfig;
