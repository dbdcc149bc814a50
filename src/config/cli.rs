use crate::config::toml_config::StorefrontConfig;
use crate::utils::error::Result;
use clap::{Parser, Subcommand};

#[derive(Debug, Clone, Parser)]
#[command(name = "moraqqat-subscribe")]
#[command(about = "Configure and submit pet food subscriptions against the Moraqqat storefront")]
pub struct CliArgs {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Storefront API base URL (overrides the config file)
    #[arg(long)]
    pub base_url: Option<String>,

    /// Bearer token for the signed-in user (overrides the config file)
    #[arg(long)]
    pub token: Option<String>,

    /// Submission timeout in seconds (overrides the config file)
    #[arg(long)]
    pub submit_timeout: Option<u64>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// List subscription plans and add-ons
    Catalog,

    /// List the pets owned by a user
    Pets {
        #[arg(long)]
        user: i64,
    },

    /// Select a pet, plan and add-ons, then create the subscription
    Subscribe {
        #[arg(long)]
        user: i64,

        #[arg(long)]
        pet: i64,

        #[arg(long)]
        plan: i64,

        #[arg(long = "add-on", value_delimiter = ',')]
        add_ons: Vec<i64>,

        /// Show the summary without submitting
        #[arg(long)]
        dry_run: bool,
    },

    /// List a user's existing subscriptions
    Subscriptions {
        #[arg(long)]
        user: i64,
    },
}

impl CliArgs {
    /// Loads the config file if one was given, then applies command line overrides.
    pub fn load_config(&self) -> Result<StorefrontConfig> {
        let mut config = match &self.config {
            Some(path) => StorefrontConfig::from_file(path)?,
            None => StorefrontConfig::default(),
        };

        if let Some(base_url) = &self.base_url {
            config.api.base_url = base_url.clone();
        }
        if let Some(token) = &self.token {
            config.api.auth_token = Some(token.clone());
        }
        if let Some(timeout) = self.submit_timeout {
            config.submission.timeout_seconds = Some(timeout);
        }
        Ok(config)
    }
}
