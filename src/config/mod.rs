pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
use crate::app::render::OutputFormat;
#[cfg(feature = "cli")]
use crate::core::SortMode;
#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};
#[cfg(feature = "cli")]
use std::{convert::Infallible, fmt, str::FromStr};
#[cfg(feature = "cli")]
use toml_config::TomlConfig;

/// A command-line value that must not reach the logs.
#[cfg(feature = "cli")]
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

#[cfg(feature = "cli")]
impl Secret {
    pub fn expose(&self) -> &str {
        &self.0
    }
}

#[cfg(feature = "cli")]
impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("\"***\"")
    }
}

#[cfg(feature = "cli")]
impl FromStr for Secret {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

#[cfg(feature = "cli")]
fn parse_sort_mode(value: &str) -> Result<SortMode, String> {
    value.parse()
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "psy-catalog")]
#[command(about = "Browse psychologists, keep favorites and request appointments")]
pub struct CliConfig {
    /// Path to a TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Document store root URL
    #[arg(long, global = true)]
    pub database_url: Option<String>,

    /// API key of the auth provider
    #[arg(long, global = true)]
    pub api_key: Option<Secret>,

    /// Directory for the saved session and offline favorites
    #[arg(long, global = true)]
    pub state_dir: Option<String>,

    /// Use the built-in catalog and local favorites
    #[arg(long, global = true)]
    pub offline: bool,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Log as JSON lines")]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// List psychologists
    List {
        /// Sort mode name (`price-desc`) or menu label ("Popular")
        #[arg(short, long, value_parser = parse_sort_mode)]
        sort: Option<SortMode>,
        /// How many times to press "Load more"
        #[arg(long, default_value_t = 0)]
        more: usize,
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
    /// List your favorite psychologists
    Favorites {
        /// Sort mode name (`price-desc`) or menu label ("Popular")
        #[arg(short, long, value_parser = parse_sort_mode)]
        sort: Option<SortMode>,
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
    /// Add a psychologist to favorites, or remove it if already there
    Favorite {
        /// Record key or display name
        identity: String,
    },
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: Secret,
    },
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: Secret,
    },
    Logout,
    Whoami,
    /// Request an appointment
    Book {
        /// Record key or display name
        identity: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        phone: String,
        #[arg(long)]
        time: String,
        #[arg(long)]
        comment: String,
    },
    /// Show the appointment time slots
    Slots,
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// 命令列參數覆蓋設定檔
    pub fn apply_overrides(&self, config: &mut TomlConfig) {
        if let Some(url) = &self.database_url {
            config.source.database_url = Some(url.clone());
        }
        if let Some(api_key) = &self.api_key {
            config.auth.api_key = Some(api_key.expose().to_string());
        }
        if let Some(state_dir) = &self.state_dir {
            config.storage.state_dir = Some(state_dir.clone());
        }
        if self.offline {
            config.source.database_url = None;
        }
        if self.json_logs {
            config.logging.json = Some(true);
        }
    }
}

#[cfg(all(test, feature = "cli"))]
mod tests {
    use super::*;
    use crate::core::ConfigProvider;

    #[test]
    fn test_parse_list_command() {
        let cli = CliConfig::parse_from([
            "psy-catalog",
            "list",
            "--sort",
            "price-desc",
            "--more",
            "2",
            "--format",
            "json",
        ]);
        match cli.command {
            Command::List { sort, more, format } => {
                assert_eq!(sort, Some(SortMode::PriceDesc));
                assert_eq!(more, 2);
                assert_eq!(format, OutputFormat::Json);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_overrides_win_over_file() {
        let cli = CliConfig::parse_from([
            "psy-catalog",
            "--state-dir",
            "/tmp/state",
            "--offline",
            "whoami",
        ]);
        let mut config = TomlConfig::from_toml_str(
            "[source]\ndatabase_url = \"https://x.firebaseio.com\"\n",
        )
        .unwrap();

        cli.apply_overrides(&mut config);

        assert_eq!(config.database_url(), None);
        assert_eq!(config.state_dir(), "/tmp/state");
    }

    #[test]
    fn test_sort_accepts_menu_labels() {
        let cli = CliConfig::parse_from(["psy-catalog", "favorites", "--sort", "Less than 10$"]);
        match cli.command {
            Command::Favorites { sort, .. } => assert_eq!(sort, Some(SortMode::PriceAsc)),
            other => panic!("unexpected command: {:?}", other),
        }

        let cli = CliConfig::parse_from(["psy-catalog", "list", "--sort", "Popular"]);
        match cli.command {
            Command::List { sort, .. } => assert_eq!(sort, Some(SortMode::RatingDesc)),
            other => panic!("unexpected command: {:?}", other),
        }

        assert!(CliConfig::try_parse_from(["psy-catalog", "list", "--sort", "cheapest"]).is_err());
    }

    #[test]
    fn test_debug_output_hides_credentials() {
        let cli = CliConfig::parse_from([
            "psy-catalog",
            "--verbose",
            "--api-key",
            "AIza-very-secret",
            "login",
            "--email",
            "a@b.co",
            "--password",
            "hunter22",
        ]);
        let logged = format!("{:?}", cli);
        assert!(!logged.contains("hunter22"));
        assert!(!logged.contains("AIza-very-secret"));
        assert!(logged.contains("a@b.co"));

        match &cli.command {
            Command::Login { password, .. } => assert_eq!(password.expose(), "hunter22"),
            other => panic!("unexpected command: {:?}", other),
        }

        let mut config = TomlConfig::default();
        cli.apply_overrides(&mut config);
        assert_eq!(config.api_key(), Some("AIza-very-secret"));

        let cli = CliConfig::parse_from([
            "psy-catalog",
            "register",
            "--name",
            "Anna",
            "--email",
            "a@b.co",
            "--password",
            "hunter22",
        ]);
        assert!(!format!("{:?}", cli).contains("hunter22"));
    }
}
