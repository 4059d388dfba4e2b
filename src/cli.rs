//! CLI argument definitions using clap.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "heybattery", version, about = "Battery life estimates from charge-cycle history")]
pub struct Cli {
    /// Config file (default: $XDG_CONFIG_HOME/heybattery/heybattery.toml)
    #[arg(long, global = true, env = "HEYBATTERY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory holding cycle history and tracker state (overrides config)
    #[arg(long, global = true, env = "HEYBATTERY_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sample the battery continuously and record charge cycles
    Monitor,
    /// Read the battery once and show the remaining-time estimate
    Status,
    /// List recorded charge cycles
    History {
        /// Print the raw history array as JSON
        #[arg(long)]
        json: bool,
    },
    /// Deliver one battery sample by hand
    Feed(FeedArgs),
}

#[derive(Debug, Clone, Args)]
pub struct FeedArgs {
    /// Raw charge level
    #[arg(long, allow_negative_numbers = true)]
    pub level: i32,

    /// Level corresponding to a full battery
    #[arg(long, default_value_t = 100)]
    pub scale: i32,

    /// The device is on external power
    #[arg(long)]
    pub charging: bool,

    /// Sample time in epoch milliseconds (default: now)
    #[arg(long)]
    pub at: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn feed_defaults_to_percent_scale() {
        let cli = Cli::try_parse_from(["heybattery", "feed", "--level", "95"]).unwrap();
        let Command::Feed(args) = cli.command else {
            panic!("wrong subcommand");
        };
        assert_eq!(args.scale, 100);
        assert!(!args.charging);
        assert!(args.at.is_none());
    }

    #[test]
    fn data_dir_is_global() {
        let cli = Cli::try_parse_from(["heybattery", "history", "--json", "--data-dir", "/tmp/hb"]).unwrap();
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/hb")));
        assert!(matches!(cli.command, Command::History { json: true }));
    }
}
