#![deny(missing_docs)]
#![deny(missing_copy_implementations)]
#![deny(trivial_casts)]
#![deny(trivial_numeric_casts)]
#![deny(unused_import_braces)]
#![deny(unused_qualifications)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

//! This crate implements support for interfacing with the OctoPrint 3d
//! printer REST api, including the application key authorization workflow
//! used to obtain an api key without the user copying it by hand.

mod appkeys;
mod client;
mod connection;
mod error;
mod job;
mod route;
mod server;
mod user;
mod version;

pub use appkeys::{
    ApplicationKeyCommand, ApplicationKeyCommandKind, AuthorizationDecision, AuthorizationResponse, KeyListEntry,
    ListResponse, PendingAuthorizationDecision, PendingListEntry,
};
pub use client::Client;
pub use connection::{
    Connect, ConnectionCommand, ConnectionCurrent, ConnectionOptions, ConnectionStatus, PrinterProfile,
};
pub use error::{Error, Result};
pub use job::{Filament, Job, JobFile, JobState, JobStatus, Origin, Progress, RemainingPrintTimeSource};
pub use server::{SafeMode, ServerInformation};
pub use user::CurrentUser;
pub use version::{ParseVersionError, Version, VersionResponse, VersionTextMismatch};
