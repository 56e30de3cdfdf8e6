//! Kakao Local REST address search.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use super::{AddressMatch, GeoPoint, Geocoder};
use crate::error::GeocodeError;

const KAKAO_ADDRESS_SEARCH_URL: &str = "https://dapi.kakao.com/v2/local/search/address.json";

pub struct KakaoGeocoder {
    api_key: String,
    endpoint: String,
    client: reqwest::Client,
}

impl KakaoGeocoder {
    pub fn new(api_key: String) -> Self {
        Self::with_endpoint(api_key, KAKAO_ADDRESS_SEARCH_URL.to_string())
    }

    /// Point at a different address search endpoint (e.g. a local proxy).
    pub fn with_endpoint(api_key: String, endpoint: String) -> Self {
        Self {
            api_key,
            endpoint,
            client: reqwest::Client::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct AddressSearchResponse {
    documents: Vec<AddressDocument>,
}

/// Kakao returns coordinates as decimal strings: `x` is longitude, `y` latitude.
#[derive(Debug, Deserialize)]
struct AddressDocument {
    address_name: String,
    x: String,
    y: String,
}

fn first_match(response: AddressSearchResponse) -> Result<Option<AddressMatch>, GeocodeError> {
    let Some(doc) = response.documents.into_iter().next() else {
        return Ok(None);
    };
    let coord = |value: &str, axis: &str| {
        value.parse::<f64>().map_err(|e| {
            GeocodeError::InvalidResponse(format!("bad {axis} coordinate {value:?}: {e}"))
        })
    };
    Ok(Some(AddressMatch {
        position: GeoPoint {
            lat: coord(&doc.y, "y")?,
            lng: coord(&doc.x, "x")?,
        },
        address_name: doc.address_name,
    }))
}

#[async_trait]
impl Geocoder for KakaoGeocoder {
    async fn address_search(&self, address: &str) -> Result<Option<AddressMatch>, GeocodeError> {
        let resp = self
            .client
            .get(&self.endpoint)
            .header("Authorization", format!("KakaoAK {}", self.api_key))
            .query(&[("query", address)])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(GeocodeError::Status {
                status: status.as_u16(),
            });
        }

        let body: AddressSearchResponse = resp
            .json()
            .await
            .map_err(|e| GeocodeError::InvalidResponse(e.to_string()))?;
        debug!(address, documents = body.documents.len(), "Kakao address search");
        first_match(body)
    }
}
