use crate::core::parser::ParseReport;
use crate::domain::model::{
    CatalogState, Coordinate, GeocodedSite, Generation, Pin, Region, RegionCatalog, SiteId,
};
use chrono::Utc;

/// Result of applying one geocode completion.
#[derive(Debug, Clone, PartialEq)]
pub enum Reconciliation {
    Pinned { pin: Pin, recentered: bool },
    Unlocated { site_id: SiteId },
    /// Completion from an older region selection; discarded.
    Stale { generation: Generation },
    /// Unknown site id, or the site was already resolved.
    Ignored { site_id: SiteId },
}

/// 把地理編碼結果合併進目前州的目錄
///
/// Completions may arrive in any order. Pins are only ever appended; the
/// whole collection is cleared by [`AnnotationReconciler::reset`].
#[derive(Debug, Clone)]
pub struct AnnotationReconciler {
    catalog: RegionCatalog,
}

impl Default for AnnotationReconciler {
    fn default() -> Self {
        Self::new(Region::default())
    }
}

impl AnnotationReconciler {
    pub fn new(region: Region) -> Self {
        Self {
            catalog: RegionCatalog::empty(region, Generation::default()),
        }
    }

    pub fn catalog(&self) -> &RegionCatalog {
        &self.catalog
    }

    pub fn pins(&self) -> &[Pin] {
        &self.catalog.pins
    }

    pub fn generation(&self) -> Generation {
        self.catalog.generation
    }

    pub fn is_current(&self, generation: Generation) -> bool {
        self.catalog.generation == generation
    }

    /// 開始新的州查詢：舊資料全部丟棄
    pub fn reset(&mut self, region: Region, generation: Generation) {
        tracing::debug!(
            "Resetting catalog for {} (generation {})",
            region,
            generation
        );
        self.catalog = RegionCatalog::empty(region, generation);
        self.catalog.state = CatalogState::Fetching;
    }

    /// Installs the parsed batch; every site starts without coordinates.
    pub fn load_sites(&mut self, generation: Generation, report: ParseReport) -> bool {
        if !self.is_current(generation) {
            tracing::warn!(
                "Ignoring site batch for stale generation {} (current {})",
                generation,
                self.catalog.generation
            );
            return false;
        }

        self.catalog.dropped_records = report.total_discarded();
        self.catalog.sites = report
            .sites
            .into_iter()
            .enumerate()
            .map(|(index, site)| GeocodedSite::new(SiteId(index), site))
            .collect();

        if self.catalog.sites.is_empty() {
            self.mark_settled();
        } else {
            self.catalog.state = CatalogState::Geocoding;
        }
        true
    }

    pub fn on_geocoded(
        &mut self,
        generation: Generation,
        site_id: SiteId,
        coordinate: Option<Coordinate>,
    ) -> Reconciliation {
        if !self.is_current(generation) {
            tracing::debug!(
                "Discarding stale geocode result for site {:?} from generation {}",
                site_id,
                generation
            );
            return Reconciliation::Stale { generation };
        }

        let Some(entry) = self.catalog.sites.get_mut(site_id.0) else {
            tracing::warn!("Geocode result for unknown site {:?}", site_id);
            return Reconciliation::Ignored { site_id };
        };

        if !entry.resolve(coordinate) {
            return Reconciliation::Ignored { site_id };
        }

        let outcome = match coordinate {
            Some(coordinate) => {
                let pin = Pin {
                    site_id,
                    name: entry.site.name.clone(),
                    phone: entry.site.phone.clone(),
                    latitude: coordinate.latitude,
                    longitude: coordinate.longitude,
                };
                // 以第一個「完成」的 pin 當地圖中心
                let recentered = self.catalog.center.is_none();
                if recentered {
                    self.catalog.center = Some(coordinate);
                }
                self.catalog.pins.push(pin.clone());
                Reconciliation::Pinned { pin, recentered }
            }
            None => Reconciliation::Unlocated { site_id },
        };

        if self.catalog.pending() == 0 {
            self.mark_settled();
        }
        outcome
    }

    pub fn fail(&mut self, generation: Generation, reason: impl Into<String>) -> bool {
        if !self.is_current(generation) {
            return false;
        }
        self.catalog.sites.clear();
        self.catalog.pins.clear();
        self.catalog.center = None;
        self.catalog.state = CatalogState::Failed {
            reason: reason.into(),
        };
        self.catalog.settled_at = Some(Utc::now());
        true
    }

    /// Fan-in point: nothing more will arrive for this generation.
    pub fn settle(&mut self, generation: Generation) -> bool {
        if !self.is_current(generation) {
            return false;
        }
        if matches!(
            self.catalog.state,
            CatalogState::Fetching | CatalogState::Geocoding
        ) {
            self.mark_settled();
        }
        true
    }

    fn mark_settled(&mut self) {
        self.catalog.state = CatalogState::Settled;
        self.catalog.settled_at = Some(Utc::now());
    }
}
