use std::process::ExitCode;

use fncall_grammar::cli::CommandLineInterface;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let command_line_interface = CommandLineInterface::load();
    init_tracing(command_line_interface.log_filter());

    match command_line_interface.run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::error!("{error:#}");
            ExitCode::FAILURE
        }
    }
}

/// Logs go to stderr so grammar/docs printed on stdout stay pipeable.
fn init_tracing(filter: Option<&str>) {
    let filter = match filter {
        Some(filter) => EnvFilter::new(filter),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
