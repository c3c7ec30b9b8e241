//! Deployment orchestrator boundary.
//!
//! The checks only ever talk to [`RemoteUnit`]; [`JujuUnit`] is the
//! implementation backed by the `juju` CLI.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

use swarmcheck_common::{CommandOutput, Result, UnitId};

mod juju;
pub mod process;

pub use juju::JujuCli;

/// One addressable unit of a deployed service
#[async_trait]
pub trait RemoteUnit: Send + Sync {
    /// `service/index` identity
    fn id(&self) -> &UnitId;

    /// Publicly reachable address of the unit's machine
    fn public_address(&self) -> &str;

    /// Run a shell command on the unit
    async fn run(&self, command: &str) -> Result<CommandOutput>;

    /// Read a file from the unit's filesystem
    async fn file_contents(&self, path: &str) -> Result<String>;

    /// This unit's settings on relation `endpoint` towards `remote`
    /// (`service:endpoint`)
    async fn relation(&self, endpoint: &str, remote: &str) -> Result<HashMap<String, String>>;
}

impl std::fmt::Debug for dyn RemoteUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteUnit")
            .field("id", &format_args!("{}", self.id()))
            .field("public_address", &self.public_address())
            .finish()
    }
}

/// Ordered, fixed set of units sharing a role
#[derive(Clone)]
pub struct Service {
    name: String,
    units: Vec<Arc<dyn RemoteUnit>>,
}

impl Service {
    /// Units must already be in membership order
    pub fn new(name: impl Into<String>, units: Vec<Arc<dyn RemoteUnit>>) -> Self {
        Self {
            name: name.into(),
            units,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn units(&self) -> &[Arc<dyn RemoteUnit>] {
        &self.units
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }
}

impl std::fmt::Debug for Service {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let ids: Vec<String> = self.units.iter().map(|u| u.id().to_string()).collect();
        f.debug_struct("Service")
            .field("name", &self.name)
            .field("units", &ids)
            .finish()
    }
}
