//! Discovery backend cross-check.
//!
//! Every cluster node must point its daemon at one of the coordination
//! backend units. The configured address is read through the structured
//! `ClusterStore` query when the daemon supports it, and otherwise pattern
//! matched out of the free-form `docker info` dump.

use regex::Regex;
use std::collections::BTreeSet;
use tracing::{debug, info, warn};

use crate::config::DiscoveryConfig;
use crate::orchestrator::{RemoteUnit, Service};
use swarmcheck_common::constants::{PRIVATE_ADDRESS_KEY, commands};
use swarmcheck_common::{Result, VerifyError};

/// Addresses advertised by the backend units, collected once per run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscoveryAddressSet(BTreeSet<String>);

impl DiscoveryAddressSet {
    pub fn contains(&self, host: &str) -> bool {
        self.0.contains(host)
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.0.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl<S: Into<String>> FromIterator<S> for DiscoveryAddressSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// Extraction rule for `scheme://<host>:<port>`
#[derive(Debug, Clone)]
pub struct BackendPattern {
    re: Regex,
}

impl BackendPattern {
    pub fn new(scheme: &str, port: u16) -> Result<Self> {
        let pattern = format!(r"{}://([^\s/]+?):{}\b", regex::escape(scheme), port);
        let re = Regex::new(&pattern)
            .map_err(|e| VerifyError::Config(format!("invalid backend pattern: {}", e)))?;
        Ok(Self { re })
    }

    /// Host of the first backend URL in `text`, if any
    pub fn extract(&self, text: &str) -> Option<String> {
        self.re
            .captures(text)
            .and_then(|caps| caps.get(1))
            .map(|host| host.as_str().to_string())
    }
}

/// Collect the private address each backend unit advertises on the
/// discovery relation
pub async fn collect_addresses(
    backend: &Service,
    discovery: &DiscoveryConfig,
) -> Result<DiscoveryAddressSet> {
    let mut addresses = BTreeSet::new();

    for unit in backend.units() {
        let settings = unit
            .relation(&discovery.relation, &discovery.relation_remote)
            .await?;
        let address = settings
            .get(PRIVATE_ADDRESS_KEY)
            .map(|a| a.trim())
            .filter(|a| !a.is_empty())
            .ok_or_else(|| {
                VerifyError::remote(
                    unit.id().to_string(),
                    format!("relation '{}' has no {}", discovery.relation, PRIVATE_ADDRESS_KEY),
                )
            })?;

        debug!(unit = %unit.id(), address = address, "Backend address advertised");
        addresses.insert(address.to_string());
    }

    Ok(DiscoveryAddressSet(addresses))
}

/// Backend host a unit is configured with, plus the text it came from
pub async fn configured_backend(
    unit: &dyn RemoteUnit,
    pattern: &BackendPattern,
) -> Result<(Option<String>, String)> {
    let structured = unit.run(commands::CLUSTER_STORE_QUERY).await?;
    let store = structured.stdout.trim();
    if structured.success() && !store.is_empty() && store != "<no value>" {
        if let Some(host) = pattern.extract(store) {
            return Ok((Some(host), structured.transcript()));
        }
    }

    // Daemons without the ClusterStore field only expose it in free text
    debug!(unit = %unit.id(), "Falling back to diagnostic output");
    let info = unit.run(commands::DIAGNOSTIC).await?;
    Ok((pattern.extract(&info.stdout), info.transcript()))
}

/// Judge one unit's configured backend against the advertised set
pub fn verify_membership(
    unit: &str,
    host: Option<String>,
    output: String,
    addresses: &DiscoveryAddressSet,
) -> Result<String> {
    match host {
        None => Err(VerifyError::MissingDiscoveryConfig {
            unit: unit.to_string(),
            output,
        }),
        Some(host) if !addresses.contains(&host) => Err(VerifyError::AddressNotRegistered {
            unit: unit.to_string(),
            address: host,
            registered: addresses.to_vec(),
            output,
        }),
        Some(host) => Ok(host),
    }
}

/// Every cluster unit uses a backend address the backend advertises
pub async fn check_discovery(
    cluster: &Service,
    backend: &Service,
    discovery: &DiscoveryConfig,
) -> Result<()> {
    let addresses = collect_addresses(backend, discovery).await?;
    let pattern = BackendPattern::new(&discovery.scheme, discovery.port)?;

    for unit in cluster.units() {
        let (host, output) = configured_backend(unit.as_ref(), &pattern).await?;
        let unit_name = unit.id().to_string();
        if host.is_none() {
            warn!(unit = %unit_name, "No discovery backend configured");
        }
        let host = verify_membership(&unit_name, host, output, &addresses)?;
        debug!(unit = %unit_name, backend = %host, "Discovery backend registered");
    }

    info!(
        units = cluster.len(),
        backends = addresses.len(),
        "Discovery backend configuration verified"
    );
    Ok(())
}
