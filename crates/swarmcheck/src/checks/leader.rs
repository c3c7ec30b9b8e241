//! Leader discovery by polling.
//!
//! Swarm has no stable leader record, so every unit is asked whether it
//! currently holds leadership. This is a point-in-time observation, not a
//! consensus guarantee: leadership can move right after the probe.

use std::sync::Arc;
use tracing::{debug, info};

use crate::orchestrator::{RemoteUnit, Service};
use swarmcheck_common::constants::commands;
use swarmcheck_common::{LeaderClaim, Result, VerifyError};

/// Return the first unit, in membership order, that claims leadership.
///
/// Probes run one at a time and stop at the first leader. A service
/// without a leader is a broken deployment and yields `NoLeaderFound`.
pub async fn resolve_leader(service: &Service) -> Result<Arc<dyn RemoteUnit>> {
    for unit in service.units() {
        let probe = unit.run(commands::IS_LEADER).await?;
        let claim = LeaderClaim::from_probe(&probe);
        debug!(unit = %unit.id(), leader = claim.is_leader(), "Leadership probed");

        if claim.is_leader() {
            info!(unit = %unit.id(), service = service.name(), "Leader resolved");
            return Ok(Arc::clone(unit));
        }
    }

    Err(VerifyError::NoLeaderFound {
        service: service.name().to_string(),
        probed: service.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeUnit, service_of};

    fn follower(index: u32) -> FakeUnit {
        FakeUnit::new("swarm", index).respond("is-leader", "False\n", 0)
    }

    fn leader(index: u32) -> FakeUnit {
        FakeUnit::new("swarm", index).respond("is-leader", "True\n", 0)
    }

    #[tokio::test]
    async fn test_leader_found_at_any_position() {
        for position in 0..3u32 {
            let units = (0..3u32)
                .map(|i| if i == position { leader(i) } else { follower(i) })
                .collect();
            let (service, _) = service_of("swarm", units);

            let found = resolve_leader(&service).await.unwrap();
            assert_eq!(found.id().index, position);
        }
    }

    #[tokio::test]
    async fn test_no_leader_is_an_error() {
        let (service, _) = service_of("swarm", vec![follower(0), follower(1)]);

        let err = resolve_leader(&service).await.unwrap_err();
        assert!(matches!(
            err,
            VerifyError::NoLeaderFound { ref service, probed: 2 } if service == "swarm"
        ));
    }

    #[tokio::test]
    async fn test_probing_stops_at_first_leader() {
        let (service, handles) = service_of("swarm", vec![follower(0), leader(1), follower(2)]);

        resolve_leader(&service).await.unwrap();
        assert_eq!(handles[0].calls(), ["is-leader"]);
        assert_eq!(handles[1].calls(), ["is-leader"]);
        assert!(handles[2].calls().is_empty());
    }

    #[tokio::test]
    async fn test_failing_probe_is_not_leadership() {
        let units = vec![
            FakeUnit::new("swarm", 0).respond("is-leader", "True\n", 1),
            leader(1),
        ];
        let (service, _) = service_of("swarm", units);

        let found = resolve_leader(&service).await.unwrap();
        assert_eq!(found.id().to_string(), "swarm/1");
    }

    #[tokio::test]
    async fn test_empty_service_has_no_leader() {
        let (service, _) = service_of("swarm", vec![]);
        let result = resolve_leader(&service).await;
        tokio_test::assert_err!(result);
    }
}
