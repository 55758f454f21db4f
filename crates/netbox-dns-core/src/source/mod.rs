//! NetBox DNS source
//!
//! The NetboxDnsSource is responsible for:
//! - Resolving the configured view once, at construction
//! - Reading a zone's records and translating them (populate)
//! - Pushing planned changes back to the remote store (apply)
//!
//! ## Architecture
//!
//! ```text
//!                  ┌─────────────────┐
//!   orchestrator ─►│ NetboxDnsSource │
//!                  └─────────────────┘
//!                     │           │
//!          populate   │           │  apply
//!                     ▼           ▼
//!          ┌──────────────────┐ ┌───────────────────┐
//!          │ RecordTranslator │ │ ChangeApplicator  │
//!          └──────────────────┘ └───────────────────┘
//!                     │           │
//!                     ▼           ▼
//!                  ┌─────────────────┐
//!                  │   RecordStore   │
//!                  └─────────────────┘
//! ```
//!
//! Every remote call is awaited before the next one is issued. Nothing is
//! shared between calls for different zones.

use tracing::{debug, info, warn};

use crate::applicator::{ApplySummary, ChangeApplicator};
use crate::config::{SourceConfig, ViewSelector};
use crate::error::{Error, Result};
use crate::model::{Change, ChangeSpec, Zone};
use crate::traits::{RecordQuery, RecordStatus, RecordStore, RemoteZone, ViewFilter};
use crate::translator::{RecordTranslator, ZoneContext};

/// Populate/apply facade over a remote record store
///
/// ## Lifecycle
///
/// 1. Create with [`NetboxDnsSource::new()`]; the view is resolved here
/// 2. Call [`NetboxDnsSource::populate()`] to read zones
/// 3. Call [`NetboxDnsSource::apply()`] with the planned changes
pub struct NetboxDnsSource {
    store: Box<dyn RecordStore>,
    config: SourceConfig,
    view: ViewFilter,
    translator: RecordTranslator,
}

impl NetboxDnsSource {
    /// Create a new source
    ///
    /// # Parameters
    ///
    /// - `store`: Remote record store
    /// - `config`: Source configuration
    ///
    /// # Returns
    ///
    /// - `Ok(source)`: The configuration is valid and the view resolved
    /// - `Err(Error::ViewNotFound)`: The named view does not exist
    pub async fn new(store: Box<dyn RecordStore>, config: SourceConfig) -> Result<Self> {
        config.validate()?;

        let view = match &config.view {
            ViewSelector::Any => ViewFilter::Any,
            ViewSelector::Unassigned => ViewFilter::Unassigned,
            ViewSelector::Named(name) => {
                let view = store
                    .get_view(name)
                    .await?
                    .ok_or_else(|| Error::view_not_found(name))?;
                debug!(view = %name, id = view.id, "resolved DNS view");
                ViewFilter::Id(view.id)
            }
        };

        info!(
            store = store.store_name(),
            view = %view,
            make_absolute = config.make_absolute,
            "NetBox DNS source ready"
        );

        Ok(Self {
            translator: RecordTranslator::new(config.make_absolute),
            store,
            config,
            view,
        })
    }

    /// The resolved view filter
    pub fn view(&self) -> &ViewFilter {
        &self.view
    }

    pub fn config(&self) -> &SourceConfig {
        &self.config
    }

    /// Read the remote records of `zone` and add them to it
    ///
    /// # Parameters
    ///
    /// - `zone`: Zone to fill; its name selects the remote zone
    /// - `lenient`: Report a missing zone as `Ok(false)` instead of an error
    ///
    /// # Returns
    ///
    /// - `Ok(true)`: The zone exists and its records were added
    /// - `Ok(false)`: The zone does not exist and `lenient` was set
    /// - `Err(Error)`: Lookup, decode, duplicate or remote failure; `zone` is
    ///   left as it was
    pub async fn populate(&self, zone: &mut Zone, lenient: bool) -> Result<bool> {
        let remote_zone = match self.find_zone(zone.remote_name()).await {
            Ok(remote_zone) => remote_zone,
            Err(Error::ZoneNotFound { .. }) if lenient => {
                debug!(zone = %zone.name, "zone does not exist");
                return Ok(false);
            }
            Err(e) => return Err(e),
        };

        let query = RecordQuery::zone(remote_zone.id).with_status(RecordStatus::Active);
        let remote_records = self.store.filter_records(&query).await?;

        let context = ZoneContext::from_remote(&remote_zone, self.config.ttl);
        let records = self
            .translator
            .translate(&context, &remote_records)
            .inspect_err(|e| warn!(zone = %zone.name, error = %e, "zone could not be decoded"))?;

        let before = zone.len();
        zone.add_records(records, self.config.replace_duplicates)?;

        info!(
            zone = %zone.name,
            remote_records = remote_records.len(),
            records = zone.len() - before,
            "populated zone"
        );
        Ok(true)
    }

    /// Apply planned changes to the zone named `zone_name`
    ///
    /// The zone is looked up once; changes are applied in order.
    pub async fn apply(&self, zone_name: &str, changes: &[Change]) -> Result<ApplySummary> {
        let remote_zone = self.find_zone(zone_name.trim_end_matches('.')).await?;
        ChangeApplicator::new(self.store.as_ref(), &remote_zone, self.translator)
            .apply(changes)
            .await
    }

    /// Decode change-file entries with this source's translation settings
    pub fn decode_changes(&self, specs: &[ChangeSpec]) -> Result<Vec<Change>> {
        specs
            .iter()
            .map(|spec| self.translator.change_from_spec(spec))
            .collect()
    }

    async fn find_zone(&self, name: &str) -> Result<RemoteZone> {
        self.store
            .get_zone(name, &self.view)
            .await?
            .ok_or_else(|| Error::zone_not_found(name, self.view.to_string()))
    }
}
