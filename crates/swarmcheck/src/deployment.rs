//! The deployment under verification.

use std::sync::Arc;
use tracing::info;

use crate::config::AppConfig;
use crate::docker::{ClusterClient, DockerClient};
use crate::orchestrator::{JujuCli, Service};
use swarmcheck_common::Result;

/// Everything a run needs: configuration, the two services, and the
/// client used for the authenticated cluster call
pub struct Deployment {
    /// Application configuration
    pub config: AppConfig,

    /// Manager + agent units
    pub cluster: Service,

    /// Coordination backend units
    pub backend: Service,

    /// TLS cluster client
    pub client: Arc<dyn ClusterClient>,
}

impl Deployment {
    pub fn new(
        config: AppConfig,
        cluster: Service,
        backend: Service,
        client: Arc<dyn ClusterClient>,
    ) -> Self {
        Self {
            config,
            cluster,
            backend,
            client,
        }
    }

    /// Enumerate both services through Juju. Membership is fixed from here
    /// on for the rest of the run.
    pub async fn discover(config: AppConfig) -> Result<Self> {
        let juju = Arc::new(JujuCli::new(&config.orchestrator));

        let cluster = juju.discover(&config.cluster.service).await?;
        let backend = juju.discover(&config.cluster.backend_service).await?;
        info!(cluster = ?cluster, backend = ?backend, "Deployment discovered");

        let client = Arc::new(DockerClient::new(
            config.tls.docker_binary.clone(),
            config.tls.client_timeout(),
        ));

        Ok(Self::new(config, cluster, backend, client))
    }
}
