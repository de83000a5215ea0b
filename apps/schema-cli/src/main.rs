#[macro_use]
mod cli;
pub mod framework;
pub mod infrastructure;

use std::process::ExitCode;

use clap::Parser;
use cli::display::{Message, MessageType};

// Entry point for the CLI application
fn main() -> ExitCode {
    let cli_result = cli::Cli::parse();

    let settings = match cli::settings::read_settings() {
        Ok(settings) => settings,
        Err(e) => {
            show_message!(
                MessageType::Error,
                Message {
                    action: "Settings".to_string(),
                    details: format!("failed to read settings: {e}"),
                }
            );
            return ExitCode::from(cli::routines::EXIT_FATAL);
        }
    };

    cli::logger::setup_logging(&settings.logger);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("Failed to create Tokio runtime");

    let result = runtime.block_on(cli::top_command_handler(settings, &cli_result.command));

    match result {
        Ok(s) => {
            show_message!(s.message_type, s.message);
            ExitCode::SUCCESS
        }
        Err(e) => {
            show_message!(e.message_type, e.message);
            if let Some(err) = e.error {
                eprintln!("{err:?}");
            }
            ExitCode::from(e.exit_code)
        }
    }
}
