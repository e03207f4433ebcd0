use crate::utils::error::{Result, SiteError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 遇到格式錯誤的記錄時的處理方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum InvalidRecordPolicy {
    /// Drop the bad record and keep going.
    #[default]
    Skip,
    /// Stop at the first bad record, keeping the ones before it.
    Stop,
}

impl FromStr for InvalidRecordPolicy {
    type Err = SiteError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "skip" => Ok(InvalidRecordPolicy::Skip),
            "stop" => Ok(InvalidRecordPolicy::Stop),
            other => Err(SiteError::InvalidConfigValueError {
                field: "on_invalid_record".to_string(),
                value: other.to_string(),
                reason: "Valid values: skip, stop".to_string(),
            }),
        }
    }
}

/// 目前資料源支援的州
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Region {
    #[default]
    California,
    NewYork,
    Washington,
    NewJersey,
    Florida,
}

impl Region {
    pub const ALL: [Region; 5] = [
        Region::California,
        Region::NewYork,
        Region::Washington,
        Region::NewJersey,
        Region::Florida,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            Region::California => "California",
            Region::NewYork => "New York",
            Region::Washington => "Washington",
            Region::NewJersey => "New Jersey",
            Region::Florida => "Florida",
        }
    }

    /// 資料源 URL 使用的 slug
    pub fn slug(&self) -> &'static str {
        match self {
            Region::California => "california",
            Region::NewYork => "new-york",
            Region::Washington => "washington",
            Region::NewJersey => "new-jersey",
            Region::Florida => "florida",
        }
    }

    pub fn abbreviation(&self) -> &'static str {
        match self {
            Region::California => "CA",
            Region::NewYork => "NY",
            Region::Washington => "WA",
            Region::NewJersey => "NJ",
            Region::Florida => "FL",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Region {
    type Err = SiteError;

    fn from_str(s: &str) -> Result<Self> {
        let needle = s.trim();
        Region::ALL
            .into_iter()
            .find(|region| {
                needle.eq_ignore_ascii_case(region.display_name())
                    || needle.eq_ignore_ascii_case(region.slug())
                    || needle.eq_ignore_ascii_case(region.abbreviation())
            })
            .ok_or_else(|| SiteError::UnsupportedRegionError {
                name: s.to_string(),
            })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestingSite {
    pub name: String,
    pub phone: String,
    pub street_address: String,
    pub city: String,
    pub postal_code: String,
    pub description: String,
}

impl TestingSite {
    /// 地理編碼查詢字串，州縮寫取自選定的州
    pub fn geocode_query(&self, region: Region) -> String {
        format!(
            "{}, {}, {} {}",
            self.street_address,
            self.city,
            region.abbreviation(),
            self.postal_code
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    /// Returns `None` for non-finite or out-of-range values.
    pub fn new(latitude: f64, longitude: f64) -> Option<Self> {
        let valid = latitude.is_finite()
            && longitude.is_finite()
            && (-90.0..=90.0).contains(&latitude)
            && (-180.0..=180.0).contains(&longitude);
        valid.then_some(Self {
            latitude,
            longitude,
        })
    }
}

/// Position of a site inside its region batch, in source order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SiteId(pub usize);

/// Tag for one region selection. Completions carrying an older tag are stale.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct Generation(pub u64);

impl Generation {
    pub fn next(self) -> Self {
        Generation(self.0 + 1)
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum GeocodeStatus {
    Pending,
    Located { coordinate: Coordinate },
    Unlocated,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodedSite {
    pub id: SiteId,
    pub site: TestingSite,
    pub status: GeocodeStatus,
}

impl GeocodedSite {
    pub fn new(id: SiteId, site: TestingSite) -> Self {
        Self {
            id,
            site,
            status: GeocodeStatus::Pending,
        }
    }

    pub fn coordinate(&self) -> Option<Coordinate> {
        match self.status {
            GeocodeStatus::Located { coordinate } => Some(coordinate),
            _ => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.status, GeocodeStatus::Pending)
    }

    /// 只允許從 Pending 轉換一次，回傳是否有轉換
    pub fn resolve(&mut self, coordinate: Option<Coordinate>) -> bool {
        if !self.is_pending() {
            return false;
        }
        self.status = match coordinate {
            Some(coordinate) => GeocodeStatus::Located { coordinate },
            None => GeocodeStatus::Unlocated,
        };
        true
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pin {
    pub site_id: SiteId,
    pub name: String,
    pub phone: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl Pin {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate {
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum CatalogState {
    Idle,
    Fetching,
    Geocoding,
    Settled,
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionCatalog {
    pub region: Region,
    pub generation: Generation,
    #[serde(flatten)]
    pub state: CatalogState,
    pub sites: Vec<GeocodedSite>,
    pub pins: Vec<Pin>,
    pub center: Option<Coordinate>,
    pub dropped_records: usize,
    pub started_at: DateTime<Utc>,
    pub settled_at: Option<DateTime<Utc>>,
}

impl RegionCatalog {
    pub fn empty(region: Region, generation: Generation) -> Self {
        Self {
            region,
            generation,
            state: CatalogState::Idle,
            sites: Vec::new(),
            pins: Vec::new(),
            center: None,
            dropped_records: 0,
            started_at: Utc::now(),
            settled_at: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pins.is_empty()
    }

    pub fn pending(&self) -> usize {
        self.sites.iter().filter(|s| s.is_pending()).count()
    }

    pub fn unlocated(&self) -> usize {
        self.sites
            .iter()
            .filter(|s| matches!(s.status, GeocodeStatus::Unlocated))
            .count()
    }

    pub fn is_settled(&self) -> bool {
        matches!(self.state, CatalogState::Settled)
    }

    pub fn failure(&self) -> Option<&str> {
        match &self.state {
            CatalogState::Failed { reason } => Some(reason),
            _ => None,
        }
    }
}
