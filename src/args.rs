use std::net::IpAddr;

use clap::{Args as ClapArgs, Parser, Subcommand};

/// Browse beginner-friendly GitHub issues by issue, repository or organization
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Public URL of the site, used in canonical links and in the sitemap
    #[arg(short, long, env = "SITE_URL", default_value = "")]
    pub site_url: String,

    /// Base URL of the Supabase project serving the issue tables
    #[arg(long, env = "SUPABASE_URL")]
    pub supabase_url: Option<String>,

    /// Publishable key of the Supabase project
    #[arg(long, env = "SUPABASE_KEY", hide_env_values = true)]
    pub supabase_key: Option<String>,

    /// Google site verification token, emitted as a meta tag
    #[arg(long, env = "GOOGLE_SITE_VERIFICATION")]
    pub google_verification: Option<String>,

    /// Log-level (error, warn, info, debug, trace)
    #[arg(short, long, env = "SOS_LOG_LEVEL", default_value = "info")]
    pub log_level: log::LevelFilter,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the web site
    Serve(ServeArgs),
    /// Print the sitemap to standard output
    Sitemap,
}

#[derive(ClapArgs, Clone, Debug)]
pub struct ServeArgs {
    /// Address to listen on
    #[arg(short, long, env = "SOS_BIND", default_value = "0.0.0.0")]
    pub bind: IpAddr,

    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// Minimum delay, in seconds, between two autocomplete lookups from the same client
    #[arg(long, env = "SOS_SUGGEST_PERIOD", default_value_t = FinitePositiveF64::new_unchecked(0.1))]
    pub suggest_period: FinitePositiveF64,
}

/// A finite, strictly positive float, suitable as a rate-limiting period.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FinitePositiveF64(f64);

impl FinitePositiveF64 {
    pub fn new(value: f64) -> Option<Self> {
        (value.is_finite() && value > 0.0).then_some(Self(value))
    }

    pub const fn new_unchecked(value: f64) -> Self {
        Self(value)
    }
}

impl From<FinitePositiveF64> for f64 {
    fn from(value: FinitePositiveF64) -> Self {
        value.0
    }
}

impl std::fmt::Display for FinitePositiveF64 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::str::FromStr for FinitePositiveF64 {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: f64 = s.parse().map_err(|err| format!("{err}"))?;
        Self::new(value).ok_or_else(|| format!("{value} is not a finite positive number"))
    }
}
