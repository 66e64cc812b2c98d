//! A command line client for OctoPrint.

#![deny(missing_docs)]

mod cmd_authorize;
mod config;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use config::Config;
use octoprint::{Client, Connect, ConnectionCommand};
use serde::Serialize;
use tracing_subscriber::{prelude::*, EnvFilter};

/// This doc string acts as a help message when the user runs '--help'
/// as do all doc strings on fields.
#[derive(Parser, Debug, Clone)]
#[clap(version = clap::crate_version!(), author = clap::crate_authors!("\n"))]
struct Opts {
    /// Print debug info
    #[clap(short, long)]
    pub debug: bool,

    /// Print logs as json
    #[clap(short, long)]
    pub json: bool,

    /// Path to config file.
    #[clap(short, long, default_value = "octoprint.toml")]
    pub config: PathBuf,

    /// Base url of the OctoPrint instance, overriding the config file.
    #[clap(long, env = "OCTOPRINT_URL")]
    pub url: Option<String>,

    /// Api key, overriding the config file.
    #[clap(long, env = "OCTOPRINT_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// The subcommand to run.
    #[clap(subcommand)]
    pub subcmd: SubCommand,
}

/// A subcommand for our cli.
#[derive(Subcommand, Debug, Clone)]
enum SubCommand {
    /// Print the server and api version.
    Version,

    /// Print the server version and safe mode state.
    ServerInfo,

    /// Print the user the api key belongs to.
    CurrentUser,

    /// Print the current print job.
    Job,

    /// Print the printer connection state and options.
    Connection,

    /// Connect to the printer, or reconnect if already connected.
    Connect {
        /// Serial port to connect to.
        #[clap(long)]
        port: Option<String>,

        /// Baudrate to connect with.
        #[clap(long)]
        baudrate: Option<u32>,

        /// Printer profile to use.
        #[clap(long)]
        profile: Option<String>,

        /// Save port and baudrate as the new preferences.
        #[clap(long)]
        save: bool,

        /// Connect automatically when OctoPrint starts (`true` or `false`).
        #[clap(long)]
        autoconnect: Option<bool>,
    },

    /// Disconnect from the printer.
    Disconnect,

    /// Fake an acknowledgment from the printer.
    FakeAck,

    /// Check whether the server supports the application key workflow.
    Probe,

    /// Request an api key for an application and wait for the user to
    /// approve it.
    Authorize {
        /// Application identifier shown to the user.
        #[clap(long)]
        app: Option<String>,

        /// Only let this user answer the request.
        #[clap(long)]
        user: Option<String>,
    },

    /// Answer a pending authorization request.
    Decide {
        /// Token of the pending request, see `keys`.
        user_token: String,

        #[clap(flatten)]
        verdict: Verdict,
    },

    /// List application keys and pending requests.
    Keys {
        /// Include every user's keys (requires admin rights).
        #[clap(long)]
        all: bool,
    },

    /// Revoke an application key.
    RevokeKey {
        /// The key to revoke.
        key: String,
    },

    /// Generate an application key for the current user.
    GenerateKey {
        /// Application identifier to generate the key for.
        app: String,
    },
}

/// Grant or deny, exactly one of them.
#[derive(Args, Debug, Clone, Copy)]
#[group(required = true, multiple = false)]
struct Verdict {
    /// Grant access.
    #[clap(long)]
    pub allow: bool,

    /// Deny access.
    #[clap(long)]
    #[allow(dead_code)] // implied by `!allow`, the group requires exactly one
    pub deny: bool,
}

impl Opts {
    /// Load the config file, if any, and apply the command line overrides.
    fn load_config(&self) -> Result<Config> {
        let mut cfg = if self.config.exists() {
            Config::from_file(&self.config).with_context(|| format!("loading {}", self.config.display()))?
        } else {
            tracing::debug!(path = %self.config.display(), "no config file, using defaults");
            Config::default()
        };

        if let Some(url) = &self.url {
            cfg.server.url = url.clone();
        }
        if let Some(api_key) = &self.api_key {
            cfg.server.api_key = Some(api_key.clone());
        }

        Ok(cfg)
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let opts: Opts = Opts::parse();

    let level = if opts.debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    // Logs go to stderr, stdout is reserved for command output.
    let (json, plain) = if opts.json {
        (
            Some(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr)),
            None,
        )
    } else {
        (
            None,
            Some(tracing_subscriber::fmt::layer().with_writer(std::io::stderr)),
        )
    };

    tracing_subscriber::registry().with(filter).with(json).with(plain).init();

    let cfg = opts.load_config()?;
    let client = cfg.client()?;

    run(&opts, &cfg, &client).await
}

async fn run(opts: &Opts, cfg: &Config, client: &Client) -> Result<()> {
    match &opts.subcmd {
        SubCommand::Version => print_json(&client.version().await?),
        SubCommand::ServerInfo => print_json(&client.server_information().await?),
        SubCommand::CurrentUser => print_json(&client.current_user().await?),
        SubCommand::Job => print_json(&client.job_status().await?),
        SubCommand::Connection => print_json(&client.connection_status().await?),
        SubCommand::Connect {
            port,
            baudrate,
            profile,
            save,
            autoconnect,
        } => {
            let command = ConnectionCommand::Connect(Connect {
                port: port.clone(),
                baudrate: *baudrate,
                printer_profile: profile.clone(),
                save: *save,
                autoconnect: *autoconnect,
            });
            Ok(client.send_connection_command(&command).await?)
        }
        SubCommand::Disconnect => Ok(client.send_connection_command(&ConnectionCommand::Disconnect).await?),
        SubCommand::FakeAck => Ok(client.send_connection_command(&ConnectionCommand::FakeAck).await?),
        SubCommand::Probe => {
            let supported = client.probe_workflow_support().await?;
            println!("{}", supported);
            Ok(())
        }
        SubCommand::Authorize { app, user } => {
            let settings = &cfg.authorization;
            let app = app.as_deref().unwrap_or(&settings.app);
            let user = user.as_deref().or(settings.user.as_deref());

            let api_key = cmd_authorize::main(client, app, user, settings).await?;
            println!("{}", api_key);
            Ok(())
        }
        SubCommand::Decide { user_token, verdict } => Ok(client.decide(user_token, verdict.allow).await?),
        SubCommand::Keys { all } => print_json(&client.list_application_keys(*all).await?),
        SubCommand::RevokeKey { key } => Ok(client.revoke_application_key(key).await?),
        SubCommand::GenerateKey { app } => Ok(client.generate_application_key(app).await?),
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Opts::command().debug_assert();
    }

    #[test]
    fn test_decide_requires_one_verdict() {
        assert!(Opts::try_parse_from(["octoprint-cli", "decide", "t0k3n"]).is_err());
        assert!(Opts::try_parse_from(["octoprint-cli", "decide", "t0k3n", "--allow", "--deny"]).is_err());

        let opts = Opts::try_parse_from(["octoprint-cli", "decide", "t0k3n", "--deny"]).unwrap();
        match opts.subcmd {
            SubCommand::Decide { user_token, verdict } => {
                assert_eq!(user_token, "t0k3n");
                assert!(!verdict.allow);
                assert!(verdict.deny);
            }
            other => panic!("unexpected subcommand {:?}", other),
        }

        let opts = Opts::try_parse_from(["octoprint-cli", "decide", "t0k3n", "--allow"]).unwrap();
        match opts.subcmd {
            SubCommand::Decide { verdict, .. } => assert!(verdict.allow),
            other => panic!("unexpected subcommand {:?}", other),
        }
    }

    #[test]
    fn test_overrides_apply_without_config_file() {
        let opts = Opts::try_parse_from([
            "octoprint-cli",
            "--config",
            "/nonexistent/octoprint.toml",
            "--url",
            "http://octopi.local",
            "--api-key",
            "secret",
            "version",
        ])
        .unwrap();

        let cfg = opts.load_config().unwrap();
        assert_eq!(cfg.server.url, "http://octopi.local");
        assert_eq!(cfg.server.api_key.as_deref(), Some("secret"));
    }
}
