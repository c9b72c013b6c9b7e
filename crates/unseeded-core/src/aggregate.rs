//! Cross-backend union of seeded content.

use futures_util::future::join_all;
use tracing::{info, warn};
use unseeded_config::ServiceConfig;

use crate::client::{Connector, collect_seeded};
use crate::error::{FailureStage, ServiceFailure};
use crate::index::{ContentIndex, SeededPaths};

/// Union of every reachable backend's content.
#[derive(Debug, Default)]
pub struct Aggregation {
    /// Content paths reported by the backends that answered.
    pub index: ContentIndex,
    /// Backends that could not contribute, in configuration order.
    pub errors: Vec<ServiceFailure>,
}

impl Aggregation {
    /// Whether no backend reported any content.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

/// Connect to one service, list its torrents, and translate their paths.
///
/// # Errors
///
/// Returns a [`ServiceFailure`] naming the service and the phase that failed.
pub async fn fetch_seeded(
    connector: &dyn Connector,
    service: &ServiceConfig,
) -> Result<SeededPaths, ServiceFailure> {
    let mappings = service.path_mappings();
    let client = connector
        .connect(service)
        .await
        .map_err(|error| ServiceFailure::new(&service.name, FailureStage::Connect, error))?;
    let records = client
        .list_torrents()
        .await
        .map_err(|error| ServiceFailure::new(&service.name, FailureStage::Fetch, error))?;
    let seeded = collect_seeded(&records, &mappings);
    info!(
        service = %service.name,
        torrents = records.len(),
        content_paths = seeded.content.len(),
        "collected seeded content"
    );
    Ok(seeded)
}

/// Query every service concurrently and union their content paths.
///
/// Failing services are recorded and skipped; the rest still contribute.
pub async fn aggregate(connector: &dyn Connector, services: &[ServiceConfig]) -> Aggregation {
    let outcomes = join_all(
        services
            .iter()
            .map(|service| fetch_seeded(connector, service)),
    )
    .await;

    let mut aggregation = Aggregation::default();
    for outcome in outcomes {
        match outcome {
            Ok(seeded) => aggregation.index.merge(seeded.content),
            Err(failure) => {
                warn!(
                    service = %failure.service,
                    stage = ?failure.stage,
                    error = %failure.error.describe(),
                    "backend skipped during aggregation"
                );
                aggregation.errors.push(failure);
            }
        }
    }
    info!(
        services = services.len(),
        failed = aggregation.errors.len(),
        content_paths = aggregation.index.len(),
        "aggregated seeded content"
    );
    aggregation
}
