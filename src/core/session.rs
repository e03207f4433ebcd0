use crate::core::geocoder::AddressGeocoder;
use crate::core::parser::{ParseReport, SiteRecordParser};
use crate::core::reconciler::{AnnotationReconciler, Reconciliation};
use crate::domain::model::{Coordinate, Generation, Region, RegionCatalog, SiteId};
use crate::domain::ports::{CatalogSource, GeocodingService};
use crate::utils::error::Result;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinSet;

/// One finished geocode task, tagged with the batch it belongs to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeocodeCompletion {
    pub generation: Generation,
    pub site_id: SiteId,
    pub coordinate: Option<Coordinate>,
}

/// 一個使用者工作階段：擁有目前的目錄與進行中的地理編碼任務
///
/// The session is the only writer of the catalog. Geocode tasks return
/// tagged completions that are applied one at a time, so results from an
/// earlier region selection can never reach the current one.
pub struct SiteFinderSession<F, G>
where
    F: CatalogSource,
    G: GeocodingService + 'static,
{
    fetcher: F,
    parser: SiteRecordParser,
    geocoder: Arc<AddressGeocoder<G>>,
    reconciler: AnnotationReconciler,
    generation: Generation,
    in_flight: JoinSet<GeocodeCompletion>,
    updates: watch::Sender<RegionCatalog>,
}

impl<F, G> SiteFinderSession<F, G>
where
    F: CatalogSource,
    G: GeocodingService + 'static,
{
    pub fn new(fetcher: F, parser: SiteRecordParser, geocoder: G) -> Self {
        let reconciler = AnnotationReconciler::default();
        let (updates, _) = watch::channel(reconciler.catalog().clone());
        Self {
            fetcher,
            parser,
            geocoder: Arc::new(AddressGeocoder::new(geocoder)),
            reconciler,
            generation: Generation::default(),
            in_flight: JoinSet::new(),
            updates,
        }
    }

    pub fn catalog(&self) -> &RegionCatalog {
        self.reconciler.catalog()
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Live view of the catalog; a new snapshot is published after every change.
    pub fn subscribe(&self) -> watch::Receiver<RegionCatalog> {
        self.updates.subscribe()
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// 選擇新的州：抓取、解析，然後為每個站點發出地理編碼任務
    ///
    /// Returns once every geocode task is spawned; completions are applied by
    /// [`next_completion`](Self::next_completion) or [`settle`](Self::settle).
    /// On fetch or parse failure the catalog stays empty in `Failed` state.
    pub async fn select_region(&mut self, region: Region) -> Result<Generation> {
        self.generation = self.generation.next();
        let generation = self.generation;

        // 取消上一個州的任務；已完成但尚未套用的結果會因世代不符被丟棄
        self.in_flight.abort_all();
        self.reconciler.reset(region, generation);
        self.publish();

        tracing::info!("🗺️ Selected {} (generation {})", region, generation);

        let report = match self.fetch_and_parse(region).await {
            Ok(report) => report,
            Err(e) => {
                tracing::error!("❌ Site lookup for {} failed: {}", region, e);
                self.reconciler.fail(generation, e.to_string());
                self.publish();
                return Err(e);
            }
        };

        let sites: Vec<_> = report.sites.clone();
        tracing::info!(
            "📊 {} testing sites for {} ({} records dropped)",
            sites.len(),
            region,
            report.total_discarded()
        );
        self.reconciler.load_sites(generation, report);
        self.publish();

        for (index, site) in sites.into_iter().enumerate() {
            let geocoder = Arc::clone(&self.geocoder);
            self.in_flight.spawn(async move {
                let coordinate = geocoder.geocode(&site, region).await;
                GeocodeCompletion {
                    generation,
                    site_id: SiteId(index),
                    coordinate,
                }
            });
        }

        Ok(generation)
    }

    async fn fetch_and_parse(&self, region: Region) -> Result<ParseReport> {
        let raw = self.fetcher.fetch(region).await?;
        tracing::debug!("Fetched {} bytes for {}", raw.len(), region);
        self.parser.parse_report(&raw)
    }

    /// Waits for the next geocode task and applies it. `None` once nothing is in flight.
    pub async fn next_completion(&mut self) -> Option<Reconciliation> {
        loop {
            let joined = self.in_flight.join_next().await?;
            match joined {
                Ok(completion) => return Some(self.apply(completion)),
                Err(e) if e.is_cancelled() => continue,
                Err(e) => {
                    tracing::error!("Geocode task failed: {}", e);
                    continue;
                }
            }
        }
    }

    pub fn apply(&mut self, completion: GeocodeCompletion) -> Reconciliation {
        let outcome = self.reconciler.on_geocoded(
            completion.generation,
            completion.site_id,
            completion.coordinate,
        );

        match &outcome {
            Reconciliation::Pinned { pin, recentered } => {
                tracing::debug!("📍 Pinned {} at ({}, {})", pin.name, pin.latitude, pin.longitude);
                if *recentered {
                    tracing::info!("🎯 Centering map on {}", pin.name);
                }
                self.publish();
            }
            Reconciliation::Unlocated { .. } => self.publish(),
            Reconciliation::Stale { generation } => {
                tracing::debug!("Dropped stale result from generation {}", generation);
            }
            Reconciliation::Ignored { site_id } => {
                tracing::debug!("Ignored duplicate result for site {:?}", site_id);
            }
        }
        outcome
    }

    /// 等待所有任務完成後回傳目錄
    pub async fn settle(&mut self) -> &RegionCatalog {
        while self.next_completion().await.is_some() {}

        if self.reconciler.settle(self.generation) {
            self.publish();
        }
        let catalog = self.reconciler.catalog();
        tracing::info!(
            "✅ {} settled: {} pins, {} unlocated",
            catalog.region,
            catalog.pins.len(),
            catalog.unlocated()
        );
        catalog
    }

    /// `select_region` followed by `settle`.
    pub async fn show_region(&mut self, region: Region) -> Result<&RegionCatalog> {
        self.select_region(region).await?;
        Ok(self.settle().await)
    }

    fn publish(&self) {
        self.updates.send_replace(self.reconciler.catalog().clone());
    }
}
