use std::{path::PathBuf, time::Duration};

use kvseed_commands::command::{Cli, Input};
use kvseed_config::{Config, LogFilter};
use kvseed_consul::ClientOptions;
use kvseed_core::PathPrefix;

use crate::error::{KvseedError, KvseedResult};

pub const DEFAULT_ENV: &str = "dev";

/// Everything a run needs, resolved once at startup.
///
/// Flags and environment variables win over the config file, which wins over
/// built-in defaults.
#[derive(Debug, Clone)]
pub struct Settings {
    pub client: ClientOptions,
    pub prefix: PathPrefix,
    pub input: Input,
    pub dry_run: bool,
    pub json: bool,
    pub log_level: LogFilter,
    pub log_dir: Option<PathBuf>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn required(
    flag: Option<String>,
    config: Option<String>,
    name: &'static str,
) -> KvseedResult<String> {
    non_empty(flag)
        .or_else(|| non_empty(config))
        .ok_or(KvseedError::MissingSetting { name })
}

impl Settings {
    pub fn resolve(cli: Cli, config: Config) -> KvseedResult<Self> {
        let env = non_empty(cli.env)
            .or_else(|| non_empty(config.env))
            .unwrap_or_else(|| DEFAULT_ENV.to_string());
        let project = required(cli.project, config.project, "project")?;
        let userenv = required(cli.userenv, config.userenv, "userenv")?;

        let timeout = cli
            .timeout
            .or(config.timeout_secs)
            .map_or(kvseed_consul::DEFAULT_TIMEOUT, Duration::from_secs);

        let client = ClientOptions::builder()
            .maybe_address(non_empty(cli.addr).or_else(|| non_empty(config.addr)))
            .maybe_token(cli.token.or(config.token))
            .maybe_scheme(cli.scheme.or(config.scheme))
            .maybe_datacenter(non_empty(cli.datacenter).or_else(|| non_empty(config.datacenter)))
            .timeout(timeout)
            .build();

        Ok(Self {
            client,
            prefix: PathPrefix::new(&env, &project, &userenv),
            input: cli.file,
            dry_run: cli.dry_run,
            json: cli.json,
            log_level: cli.log_level.or(config.log_level).unwrap_or_default(),
            log_dir: cli.log_dir.or(config.log_dir),
        })
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser as _;
    use kvseed_consul::Scheme;

    use super::*;

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("kvseed").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_prefix_from_flags() {
        let settings = Settings::resolve(
            cli(&["-e", "prod", "-p", "svc", "-u", "alice"]),
            Config::default(),
        )
        .unwrap();

        assert_eq!(settings.prefix.as_str(), "config/prod/svc/alice");
        assert_eq!(settings.input, Input::Stdin);
        assert_eq!(settings.log_level, LogFilter::Warn);
    }

    #[test]
    fn test_env_defaults_to_dev() {
        let settings =
            Settings::resolve(cli(&["-p", "svc", "-u", "alice"]), Config::default()).unwrap();

        assert_eq!(settings.prefix.as_str(), "config/dev/svc/alice");
    }

    #[test]
    fn test_config_fills_gaps() {
        let config = Config {
            env: Some("staging".to_string()),
            project: Some("web".to_string()),
            userenv: Some("bob".to_string()),
            addr: Some("https://consul.internal:8501".to_string()),
            scheme: Some(Scheme::Https),
            log_level: Some(LogFilter::Debug),
            ..Config::default()
        };

        let settings = Settings::resolve(cli(&["-u", "carol", "--addr", "consul:8500"]), config)
            .unwrap();

        assert_eq!(settings.prefix.as_str(), "config/staging/web/carol");
        assert_eq!(
            settings.client.base_url().unwrap().as_str(),
            "https://consul:8500/"
        );
        assert_eq!(settings.log_level, LogFilter::Debug);
    }

    #[test]
    fn test_missing_project() {
        let result = Settings::resolve(cli(&["-u", "alice"]), Config::default());
        assert!(matches!(
            result,
            Err(KvseedError::MissingSetting { name: "project" })
        ));
    }

    #[test]
    fn test_blank_userenv_counts_as_missing() {
        let result = Settings::resolve(cli(&["-p", "svc", "-u", "  "]), Config::default());
        assert!(matches!(
            result,
            Err(KvseedError::MissingSetting { name: "userenv" })
        ));
    }
}
