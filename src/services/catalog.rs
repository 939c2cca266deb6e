// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Hotel catalog loading and price-comparison search.

use crate::models::{GuestInfo, Hotel, LocationType, SearchLocation, SortedHotel};
use std::fs;
use std::path::Path;

/// Hotels available for comparison, loaded once at startup.
#[derive(Default, Clone)]
pub struct HotelCatalog {
    hotels: Vec<Hotel>,
}

/// What the visitor is looking for.
#[derive(Debug, Clone, Default)]
pub struct SearchQuery {
    /// Free-text match against hotel name or location
    pub location: Option<String>,
    pub guests: GuestInfo,
}

impl HotelCatalog {
    /// Load hotels from a JSON file (an array of hotels).
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let json_data =
            fs::read_to_string(path.as_ref()).map_err(|e| CatalogError::IoError(e.to_string()))?;
        Self::load_from_json(&json_data)
    }

    /// Load hotels from a JSON string.
    pub fn load_from_json(json_data: &str) -> Result<Self, CatalogError> {
        let hotels: Vec<Hotel> =
            serde_json::from_str(json_data).map_err(|e| CatalogError::ParseError(e.to_string()))?;

        tracing::info!(count = hotels.len(), "Loaded hotels");
        Ok(Self { hotels })
    }

    pub fn new(hotels: Vec<Hotel>) -> Self {
        Self { hotels }
    }

    pub fn hotels(&self) -> &[Hotel] {
        &self.hotels
    }

    /// Matching hotels, cheapest first. Hotels without offers are skipped.
    pub fn search(&self, query: &SearchQuery) -> Vec<SortedHotel> {
        let needle = query
            .location
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase);
        let needs_pets = query.guests.pet_count() > 0;

        let mut results: Vec<SortedHotel> = self
            .hotels
            .iter()
            .filter(|h| !needs_pets || h.pet_friendly)
            .filter(|h| match &needle {
                Some(n) => {
                    h.name.to_lowercase().contains(n) || h.location.to_lowercase().contains(n)
                }
                None => true,
            })
            .filter_map(Hotel::compare_prices)
            .collect();

        results.sort_by(|a, b| a.best_price.total_cmp(&b.best_price));
        results
    }

    /// Location suggestions for the search box: cities first, then hotels,
    /// matching `prefix` case-insensitively anywhere in the name.
    pub fn locations(&self, prefix: &str) -> Vec<SearchLocation> {
        let needle = prefix.trim().to_lowercase();
        let hit = |name: &str| needle.is_empty() || name.to_lowercase().contains(&needle);

        let mut cities: Vec<&str> = self
            .hotels
            .iter()
            .map(|h| h.location.as_str())
            .filter(|name| hit(*name))
            .collect();
        cities.sort_unstable();
        cities.dedup();

        let city_suggestions = cities.into_iter().map(|name| SearchLocation {
            id: format!("city:{}", name),
            name: name.to_string(),
            location_type: LocationType::City,
        });
        let hotel_suggestions = self
            .hotels
            .iter()
            .filter(|h| hit(h.name.as_str()))
            .map(|h| SearchLocation {
                id: h.id.clone(),
                name: h.name.clone(),
                location_type: LocationType::Hotel,
            });

        city_suggestions.chain(hotel_suggestions).collect()
    }
}

/// Errors from catalog operations.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Failed to read file: {0}")]
    IoError(String),

    #[error("Failed to parse hotel catalog: {0}")]
    ParseError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Pet, PetType};

    const CATALOG: &str = r#"[
        {
            "id": "h1", "name": "Harbor View", "location": "Monterey, CA",
            "image": "/img/h1.jpg", "rating": 4.4, "petFriendly": true, "petFee": 30,
            "prices": [
                {"website": "Booking.com", "price": 240},
                {"website": "Expedia", "price": 250, "seasonalPrice": 215, "seasonalDiscount": 14}
            ]
        },
        {
            "id": "h2", "name": "Cannery Row Inn", "location": "Monterey, CA",
            "image": "/img/h2.jpg", "rating": 4.1,
            "prices": [{"website": "Hotels.com", "price": 180}]
        },
        {
            "id": "h3", "name": "Mission Ranch", "location": "Carmel, CA",
            "image": "/img/h3.jpg", "rating": 4.8, "prices": []
        }
    ]"#;

    #[test]
    fn test_search_sorted_by_best_price() {
        let catalog = HotelCatalog::load_from_json(CATALOG).unwrap();
        assert_eq!(catalog.hotels().len(), 3);

        let results = catalog.search(&SearchQuery::default());
        let ids: Vec<&str> = results.iter().map(|r| r.hotel.id.as_str()).collect();
        // h3 has no offers and is left out
        assert_eq!(ids, vec!["h2", "h1"]);
        assert_eq!(results[1].best_website, "Expedia");
    }

    #[test]
    fn test_search_by_location_and_pets() {
        let catalog = HotelCatalog::load_from_json(CATALOG).unwrap();

        let query = SearchQuery {
            location: Some("  monterey ".to_string()),
            guests: GuestInfo {
                adults: 2,
                children: vec![],
                pets: vec![Pet {
                    id: "p1".to_string(),
                    pet_type: PetType::Dog,
                    count: 1,
                }],
            },
        };
        let results = catalog.search(&query);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].hotel.id, "h1");

        let query = SearchQuery {
            location: Some("carmel".to_string()),
            ..Default::default()
        };
        assert!(catalog.search(&query).is_empty());
    }

    #[test]
    fn test_locations() {
        let catalog = HotelCatalog::load_from_json(CATALOG).unwrap();

        let all = catalog.locations("");
        let names: Vec<&str> = all.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["Carmel, CA", "Monterey, CA", "Harbor View", "Cannery Row Inn", "Mission Ranch"]
        );

        let found = catalog.locations("ROW");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].location_type, LocationType::Hotel);
        assert_eq!(found[0].id, "h2");
    }

    #[test]
    fn test_bad_json() {
        assert!(matches!(
            HotelCatalog::load_from_json("{not json"),
            Err(CatalogError::ParseError(_))
        ));
    }
}
