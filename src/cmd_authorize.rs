use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use octoprint::{AuthorizationDecision, Client, PendingAuthorizationDecision};

use crate::config::AuthorizationConfig;

/// Run the application key workflow and return the granted key.
pub async fn main(client: &Client, app: &str, user: Option<&str>, settings: &AuthorizationConfig) -> Result<String> {
    if !client
        .probe_workflow_support()
        .await
        .context("probing for application key support")?
    {
        bail!("the application keys plugin is disabled on this server; copy an api key from its settings instead");
    }

    let pending = client
        .start_authorization(app, user)
        .await
        .context("starting authorization")?;
    tracing::info!(endpoint = %pending.endpoint, "authorization requested");
    eprintln!("Approve access for '{}' at {}", app, pending.response.auth_dialog);

    tokio::select! {
        decision = wait_for_decision(client, &pending, settings.poll_interval(), settings.timeout()) => decision,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("received Ctrl+C, abandoning authorization request");
            bail!("authorization cancelled")
        }
    }
}

/// Poll `pending` every `interval` until it is decided or `timeout` passes.
///
/// Dropping the returned future abandons the request; OctoPrint discards it
/// once polling stops.
pub async fn wait_for_decision(
    client: &Client,
    pending: &PendingAuthorizationDecision,
    interval: Duration,
    timeout: Duration,
) -> Result<String> {
    tokio::time::timeout(timeout, poll_until_decided(client, pending, interval))
        .await
        .map_err(|_| anyhow!("no decision after {:?}", timeout))?
}

async fn poll_until_decided(
    client: &Client,
    pending: &PendingAuthorizationDecision,
    interval: Duration,
) -> Result<String> {
    let mut ticker = tokio::time::interval(interval);
    loop {
        ticker.tick().await;
        match client.poll_decision(pending).await? {
            None => tracing::debug!("authorization still pending"),
            Some(AuthorizationDecision::Granted { api_key }) => return Ok(api_key),
            Some(AuthorizationDecision::Denied) => bail!("authorization was denied or expired"),
        }
    }
}
