use crate::config::toml_config::SiteConfig;
use crate::utils::error::{Result, SiteError};
use crate::utils::validation::validate_url;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "racketpro-web")]
#[command(about = "Drive the RacketPro Web page interactions from the command line")]
pub struct CliConfig {
    #[arg(long, help = "Path to a TOML site configuration")]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Override site.base_url from the configuration")]
    pub base_url: Option<String>,

    #[arg(long, value_enum, default_value = "compact")]
    pub log_format: LogFormat,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Compact,
    Json,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Fill in the contact form on a sample page and submit it
    Submit {
        #[arg(long, default_value = "")]
        name: String,

        #[arg(long, default_value = "")]
        email: String,

        #[arg(long, default_value = "")]
        message: String,

        /// Extra form fields as key=value
        #[arg(long = "field", value_parser = parse_key_value)]
        fields: Vec<(String, String)>,
    },

    /// Rotate a sample testimonial carousel and print the active slide
    Carousel {
        #[arg(long, default_value = "3")]
        slides: usize,

        #[arg(long, default_value = "3")]
        ticks: usize,

        #[arg(long, help = "Override carousel.interval_ms")]
        interval_ms: Option<u64>,
    },

    /// Load and validate the configuration, then print it
    CheckConfig,
}

fn parse_key_value(raw: &str) -> std::result::Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected key=value, got `{}`", raw)),
    }
}

impl CliConfig {
    /// Resolves the effective site configuration: file (or defaults) plus CLI overrides.
    pub fn site_config(&self) -> Result<SiteConfig> {
        let mut config = match &self.config {
            Some(path) => SiteConfig::from_file(path)?,
            None => SiteConfig::default(),
        };

        if let Some(base_url) = &self.base_url {
            validate_url("--base-url", base_url)?;
            config.site.base_url = base_url.clone();
        }

        if let Command::Carousel {
            interval_ms: Some(interval_ms),
            ..
        } = &self.command
        {
            config.carousel.interval_ms = *interval_ms;
        }

        Ok(config)
    }

    pub fn missing_config_file(&self) -> Option<SiteError> {
        self.config
            .as_ref()
            .filter(|path| !path.exists())
            .map(|path| SiteError::ConfigError {
                message: format!("configuration file {} does not exist", path.display()),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_submit_command() {
        let cli = CliConfig::parse_from([
            "racketpro-web",
            "--base-url",
            "http://127.0.0.1:9000",
            "submit",
            "--name",
            "Ada",
            "--email",
            "ada@example.com",
            "--message",
            "Restring please",
            "--field",
            "phone=555-0100",
        ]);

        match &cli.command {
            Command::Submit { name, fields, .. } => {
                assert_eq!(name, "Ada");
                assert_eq!(fields, &vec![("phone".to_string(), "555-0100".to_string())]);
            }
            other => panic!("unexpected command: {:?}", other),
        }

        let config = cli.site_config().unwrap();
        assert_eq!(config.lead_endpoint(), "http://127.0.0.1:9000/api/leads");
    }

    #[test]
    fn test_carousel_interval_override() {
        let cli = CliConfig::parse_from(["racketpro-web", "carousel", "--interval-ms", "250"]);
        let config = cli.site_config().unwrap();
        assert_eq!(config.carousel.interval_ms, 250);
    }

    #[test]
    fn test_rejects_malformed_field() {
        assert!(CliConfig::try_parse_from(["racketpro-web", "submit", "--field", "novalue"]).is_err());
    }

    #[test]
    fn test_missing_config_file_reported() {
        let cli = CliConfig::parse_from([
            "racketpro-web",
            "--config",
            "/definitely/not/here.toml",
            "check-config",
        ]);
        assert!(cli.missing_config_file().is_some());
        assert!(cli.site_config().is_err());
    }
}
