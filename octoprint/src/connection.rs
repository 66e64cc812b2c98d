use reqwest::{Method, StatusCode};
use serde::{Deserialize, Serialize};

use crate::{client::unexpected_status, route::Route, Client, Error, Result};

/// Connection state and options, from `GET api/connection`.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct ConnectionStatus {
    /// The current connection.
    pub current: ConnectionCurrent,

    /// Everything that could be connected to.
    pub options: ConnectionOptions,
}

/// The printer connection as it is right now.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionCurrent {
    /// Connection state, e.g. `Operational` or `Closed`.
    pub state: String,

    /// Serial port, unset while disconnected.
    pub port: Option<String>,

    /// Baudrate, unset while disconnected.
    pub baudrate: Option<u32>,

    /// Identifier of the active printer profile.
    pub printer_profile: Option<String>,
}

/// Available ports, baudrates and profiles, plus the saved preferences.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionOptions {
    /// Serial ports found on the host.
    pub ports: Vec<String>,

    /// Supported baudrates.
    pub baudrates: Vec<u32>,

    /// Configured printer profiles.
    pub printer_profiles: Vec<PrinterProfile>,

    /// Saved port.
    pub port_preference: Option<String>,

    /// Saved baudrate.
    pub baudrate_preference: Option<u32>,

    /// Saved printer profile.
    pub printer_profile_preference: Option<String>,

    /// Whether OctoPrint connects on startup.
    pub autoconnect: bool,
}

/// A printer profile that can be connected with.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct PrinterProfile {
    /// Display name.
    pub name: String,

    /// Identifier.
    pub id: String,
}

/// Command for `POST api/connection`.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum ConnectionCommand {
    /// Connect, or reconnect if already connected.
    Connect(Connect),

    /// Disconnect from the printer.
    Disconnect,

    /// Fake an acknowledgment from the printer, to unstick a connection
    /// that lost one.
    FakeAck,
}

/// Parameters of [ConnectionCommand::Connect]. Anything left unset falls
/// back to the saved preference, or to auto detection.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Connect {
    /// Specific port to connect to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<String>,

    /// Specific baudrate to connect with.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub baudrate: Option<u32>,

    /// Specific printer profile to use.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub printer_profile: Option<String>,

    /// Save `port` and `baudrate` as the new preferences.
    #[serde(default)]
    pub save: bool,

    /// Whether to connect automatically when OctoPrint starts. Unset leaves
    /// the configuration alone.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub autoconnect: Option<bool>,
}

impl Client {
    /// Retrieve the current connection state and the available options.
    pub async fn connection_status(&self) -> Result<ConnectionStatus> {
        self.get_json(Route::Connection).await
    }

    /// Connect to, disconnect from, or poke the printer.
    pub async fn send_connection_command(&self, command: &ConnectionCommand) -> Result<()> {
        tracing::debug!(?command, "sending connection command");

        let route = Route::Connection;
        let response = self.send(self.request(Method::POST, route)?.json(command)).await?;
        match response.status() {
            StatusCode::NO_CONTENT => Ok(()),
            StatusCode::BAD_REQUEST => Err(Error::BadRequest),
            StatusCode::FORBIDDEN => Err(Error::InvalidCredentials),
            status => Err(unexpected_status(route, status)),
        }
    }
}
