//! Package requirements and their reconciliation.
//!
//! - [`manifest`] reads the requirement set
//! - [`pip`] inspects and installs through the environment's pip
//! - [`registry`] looks up the latest published version
//! - [`version`] decides whether an upgrade is on offer
//! - [`confirm`] answers the upgrade question
//! - [`reconciler`] ties them together

pub mod confirm;
pub mod manifest;
pub mod pip;
pub mod reconciler;
pub mod registry;
pub mod version;

pub use confirm::{Confirmer, FixedConfirmer, RecordingConfirmer};
pub use manifest::{normalize_name, Requirement, RequirementSet, RequirementSource};
pub use pip::{parse_pip_show, PackageManager, PipManager};
pub use reconciler::{ReconcileOutcome, Reconciler};
pub use registry::{PypiRegistry, VersionSource};
pub use version::VersionPair;
