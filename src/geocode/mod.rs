//! Address geocoding and the state of the map search screen.

pub mod kakao;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{info, warn};

pub use kakao::KakaoGeocoder;

use crate::error::GeocodeError;

pub const EMPTY_ADDRESS_MESSAGE: &str = "주소를 입력해주세요.";
pub const GEOCODER_MISSING_MESSAGE: &str =
    "Kakao Maps API가 로드되지 않았습니다. 새로고침 해주세요.";
pub const NOT_FOUND_MESSAGE: &str =
    "해당 주소를 찾을 수 없습니다. 도로명 주소나 지번 주소를 정확히 입력해주세요.";

/// Marker label when a position has no resolved address name.
const FALLBACK_MARKER_LABEL: &str = "검색된 위치";

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

/// Seoul City Hall, the map center before any search.
pub const DEFAULT_CENTER: GeoPoint = GeoPoint {
    lat: 37.566826,
    lng: 126.9786567,
};

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Lat: {}, Lng: {}", self.lat, self.lng)
    }
}

/// Best match for an address query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AddressMatch {
    pub position: GeoPoint,
    pub address_name: String,
}

/// Address → coordinates lookup.
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// `Ok(None)` means the service answered but found nothing.
    async fn address_search(&self, address: &str) -> Result<Option<AddressMatch>, GeocodeError>;
}

/// What the map area shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MapPanel {
    Map {
        center: GeoPoint,
        /// Marker caption, only once a search has succeeded.
        label: Option<String>,
    },
    Unavailable {
        title: &'static str,
        detail: &'static str,
    },
}

/// State of the map search screen.
pub struct MapSearch {
    geocoder: Option<Arc<dyn Geocoder>>,
    address: String,
    position: Option<GeoPoint>,
    error: Option<String>,
    result: Option<String>,
}

impl MapSearch {
    /// `None` renders the screen without a map.
    pub fn new(geocoder: Option<Arc<dyn Geocoder>>) -> Self {
        Self {
            geocoder,
            address: String::new(),
            position: None,
            error: None,
            result: None,
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn set_address(&mut self, address: impl Into<String>) {
        self.address = address.into();
    }

    pub fn position(&self) -> Option<GeoPoint> {
        self.position
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn search_result(&self) -> Option<&str> {
        self.result.as_deref()
    }

    /// Look up the current address. Returns whether a position was found.
    pub async fn search(&mut self) -> bool {
        let query = self.address.trim().to_string();
        if query.is_empty() {
            self.error = Some(EMPTY_ADDRESS_MESSAGE.to_string());
            return false;
        }
        let Some(geocoder) = self.geocoder.clone() else {
            self.error = Some(GEOCODER_MISSING_MESSAGE.to_string());
            return false;
        };

        let found = match geocoder.address_search(&query).await {
            Ok(found) => found,
            Err(e) => {
                warn!(address = %query, error = %e, "Address search failed");
                None
            }
        };

        match found {
            Some(m) => {
                info!(
                    address = %query,
                    resolved = %m.address_name,
                    position = %m.position,
                    "Address resolved"
                );
                self.position = Some(m.position);
                self.result = Some(m.address_name);
                self.error = None;
                true
            }
            None => {
                self.error = Some(NOT_FOUND_MESSAGE.to_string());
                self.position = None;
                self.result = None;
                false
            }
        }
    }

    pub fn center(&self) -> GeoPoint {
        self.position.unwrap_or(DEFAULT_CENTER)
    }

    pub fn panel(&self) -> MapPanel {
        if self.geocoder.is_none() {
            return MapPanel::Unavailable {
                title: "⚠️ 지도를 불러올 수 없습니다",
                detail: "Kakao Maps SDK가 로드되지 않았습니다.",
            };
        }
        let label = self.position.map(|_| {
            self.result
                .clone()
                .unwrap_or_else(|| FALLBACK_MARKER_LABEL.to_string())
        });
        MapPanel::Map {
            center: self.center(),
            label,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedGeocoder(Option<AddressMatch>);

    #[async_trait]
    impl Geocoder for FixedGeocoder {
        async fn address_search(
            &self,
            _address: &str,
        ) -> Result<Option<AddressMatch>, GeocodeError> {
            Ok(self.0.clone())
        }
    }

    struct FailingGeocoder;

    #[async_trait]
    impl Geocoder for FailingGeocoder {
        async fn address_search(
            &self,
            _address: &str,
        ) -> Result<Option<AddressMatch>, GeocodeError> {
            Err(GeocodeError::Status { status: 401 })
        }
    }

    fn teheran() -> AddressMatch {
        AddressMatch {
            position: GeoPoint {
                lat: 37.5065,
                lng: 127.0536,
            },
            address_name: "서울 강남구 테헤란로 427".into(),
        }
    }

    #[tokio::test]
    async fn empty_address_is_rejected() {
        let mut search = MapSearch::new(Some(Arc::new(FixedGeocoder(Some(teheran())))));
        search.set_address("   ");
        assert!(!search.search().await);
        assert_eq!(search.error_message(), Some(EMPTY_ADDRESS_MESSAGE));
    }

    #[tokio::test]
    async fn missing_geocoder_shows_warning_panel() {
        let mut search = MapSearch::new(None);
        search.set_address("테헤란로 427");
        assert!(!search.search().await);
        assert_eq!(search.error_message(), Some(GEOCODER_MISSING_MESSAGE));
        assert!(matches!(search.panel(), MapPanel::Unavailable { .. }));
    }

    #[tokio::test]
    async fn found_address_moves_the_map() {
        let mut search = MapSearch::new(Some(Arc::new(FixedGeocoder(Some(teheran())))));
        assert_eq!(
            search.panel(),
            MapPanel::Map {
                center: DEFAULT_CENTER,
                label: None
            }
        );

        search.set_address("테헤란로 427");
        assert!(search.search().await);
        assert_eq!(search.error_message(), None);
        assert_eq!(search.search_result(), Some("서울 강남구 테헤란로 427"));
        assert_eq!(
            search.panel(),
            MapPanel::Map {
                center: teheran().position,
                label: Some("서울 강남구 테헤란로 427".into())
            }
        );
    }

    #[tokio::test]
    async fn not_found_clears_previous_result() {
        let mut search = MapSearch::new(Some(Arc::new(FixedGeocoder(Some(teheran())))));
        search.set_address("테헤란로 427");
        search.search().await;

        search.geocoder = Some(Arc::new(FixedGeocoder(None)));
        search.set_address("없는 주소");
        assert!(!search.search().await);
        assert_eq!(search.error_message(), Some(NOT_FOUND_MESSAGE));
        assert_eq!(search.position(), None);
        assert_eq!(search.search_result(), None);
        assert_eq!(search.center(), DEFAULT_CENTER);
    }

    #[tokio::test]
    async fn service_failure_reads_as_not_found() {
        let mut search = MapSearch::new(Some(Arc::new(FailingGeocoder)));
        search.set_address("테헤란로 427");
        assert!(!search.search().await);
        assert_eq!(search.error_message(), Some(NOT_FOUND_MESSAGE));
    }
}
