#[macro_use]
pub(crate) mod display;

mod commands;
pub mod logger;
pub mod routines;
pub mod settings;

use clap::Parser;
use commands::Commands;

use crate::cli::commands::ConnectionArgs;
use crate::cli::routines::{apply, plan, RoutineFailure, RoutineSuccess};
use crate::infrastructure::olap::influx::config::InfluxConfig;
use settings::Settings;

#[derive(Parser)]
#[command(author, version, about, long_about = None, arg_required_else_help(true))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Connection parameters: settings-file defaults, overridden field by field
/// by whatever flags were given.
fn resolve_influx_config(settings: &Settings, connection: &ConnectionArgs) -> InfluxConfig {
    let mut config = settings.influxdb.clone();
    if let Some(url) = &connection.url {
        config.url = url.clone();
    }
    if let Some(user) = &connection.user {
        config.user = Some(user.clone());
    }
    if let Some(password) = &connection.password {
        config.password = Some(password.clone());
    }
    config
}

pub async fn top_command_handler(
    settings: Settings,
    command: &Commands,
) -> Result<RoutineSuccess, RoutineFailure> {
    match command {
        Commands::Plan { connection } => {
            let config = resolve_influx_config(&settings, connection);
            plan(&connection.schema_dir, config).await
        }
        Commands::Apply {
            connection,
            dry_run,
            force,
        } => {
            let config = resolve_influx_config(&settings, connection);
            apply(&connection.schema_dir, config, *dry_run, *force).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_settings() {
        let settings = Settings {
            influxdb: InfluxConfig {
                url: "http://settings:8086".to_string(),
                user: Some("from_settings".to_string()),
                password: None,
            },
            ..Settings::default()
        };
        let connection = ConnectionArgs {
            schema_dir: ".".into(),
            url: Some("http://flag:8086".to_string()),
            user: None,
            password: Some("secret".to_string()),
        };
        let config = resolve_influx_config(&settings, &connection);
        assert_eq!(config.url, "http://flag:8086");
        assert_eq!(config.user.as_deref(), Some("from_settings"));
        assert_eq!(config.password.as_deref(), Some("secret"));
    }
}
