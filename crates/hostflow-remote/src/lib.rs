//! hostflow remote: deploy key provisioning
//!
//! [`RemoteAccess`] is the seam to the remote hosts; [`SshRemoteAccess`]
//! implements it with the local OpenSSH tools. [`Provisioner`] runs the
//! check / install / uninstall workflows on top of any implementation.

pub mod access;
pub mod error;
pub mod provision;
pub mod setup_file;
pub mod ssh;

pub use access::{Credentials, RemoteAccess};
pub use error::{RemoteAction, RemoteError, Result};
pub use provision::{InstallOutcome, Provisioner};
pub use setup_file::{load_setup_file, parse_setup_file};
pub use ssh::SshRemoteAccess;
