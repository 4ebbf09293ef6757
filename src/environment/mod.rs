//! Project location and virtual environment provisioning.
//!
//! - [`locator`] resolves the project root
//! - [`provisioner`] creates the environment when it is missing
//! - [`handle`] describes an activated environment for child processes

pub mod handle;
pub mod locator;
pub mod provisioner;

pub use handle::{EnvironmentDescriptor, EnvironmentHandle};
pub use locator::{find_marked_ancestor, ProjectLocation};
pub use provisioner::{Provisioned, Provisioner};
