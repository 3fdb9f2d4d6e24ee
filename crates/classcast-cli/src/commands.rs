//! Subcommands and their arguments.

use clap::{Args, Subcommand};
use classcast_core::SettingsOverrides;

/// Available commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Run the signaling relay
    Serve {
        #[command(flatten)]
        settings: SettingsArgs,
    },

    /// Show the adaptive profile table
    Profiles {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Score network metrics and recommend a profile
    Recommend {
        /// Round-trip latency in milliseconds
        #[arg(long)]
        latency: f64,
        /// Available bandwidth in kbps
        #[arg(long)]
        bandwidth: f64,
        /// Packet loss in percent
        #[arg(long, default_value_t = 0.0)]
        loss: f64,
        /// Jitter in milliseconds
        #[arg(long, default_value_t = 0.0)]
        jitter: f64,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the effective settings
    Config {
        #[command(flatten)]
        settings: SettingsArgs,
    },
}

/// Flags that override the settings file.
#[derive(Debug, Clone, Default, Args)]
pub struct SettingsArgs {
    /// Port to listen on (0 picks a free port)
    #[arg(short, long, env = "CLASSCAST_PORT")]
    pub port: Option<u16>,

    /// Address to bind
    #[arg(long = "bind", env = "CLASSCAST_BIND")]
    pub bind: Option<String>,

    /// Allowed CORS origin (repeatable; none allows any origin)
    #[arg(long = "allow-origin", env = "CLASSCAST_ALLOWED_ORIGINS", value_delimiter = ',')]
    pub allow_origin: Vec<String>,

    /// Outbound queue capacity per connection
    #[arg(long, env = "CLASSCAST_OUTBOUND_QUEUE")]
    pub outbound_queue: Option<usize>,

    /// Largest accepted signaling frame in bytes
    #[arg(long, env = "CLASSCAST_MAX_MESSAGE_BYTES")]
    pub max_message_bytes: Option<usize>,

    /// Network reports kept per user for trend analysis
    #[arg(long, env = "CLASSCAST_QUALITY_HISTORY")]
    pub quality_history: Option<usize>,

    /// Seconds between WebSocket pings
    #[arg(long, env = "CLASSCAST_PING_INTERVAL")]
    pub ping_interval: Option<u64>,
}

impl SettingsArgs {
    pub fn overrides(&self) -> SettingsOverrides {
        SettingsOverrides {
            port: self.port,
            bind_address: self.bind.clone(),
            outbound_queue_capacity: self.outbound_queue,
            max_message_bytes: self.max_message_bytes,
            quality_history: self.quality_history,
            ping_interval_secs: self.ping_interval,
            allowed_origins: self.allow_origin.clone(),
        }
    }
}
