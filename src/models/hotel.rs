// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Hotel listings and price comparison results.

use serde::{Deserialize, Serialize};

/// A hotel with prices from one or more booking websites.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hotel {
    pub id: String,
    pub name: String,
    pub location: String,
    pub image: String,
    pub prices: Vec<HotelPrice>,
    pub rating: f64,
    #[serde(default)]
    pub amenities: Vec<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub pet_friendly: bool,
    #[serde(default)]
    pub pet_fee: Option<f64>,
    #[serde(default)]
    pub seasonal_notes: Option<String>,
    #[serde(default)]
    pub coordinates: Option<Coordinates>,
}

/// One website's offer for a hotel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HotelPrice {
    pub website: String,
    pub price: f64,
    #[serde(default)]
    pub seasonal_price: Option<f64>,
    /// Discount in percent behind `seasonal_price`
    #[serde(default)]
    pub seasonal_discount: Option<f64>,
}

impl HotelPrice {
    /// Price the guest would actually pay.
    pub fn effective_price(&self) -> f64 {
        self.seasonal_price.unwrap_or(self.price)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// A hotel annotated with its cheapest offer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SortedHotel {
    #[serde(flatten)]
    pub hotel: Hotel,
    pub best_price: f64,
    pub best_website: String,
    pub comparison_steps: Vec<ComparisonStep>,
    pub seasonal_discount: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonStep {
    pub website: String,
    pub price: f64,
    pub is_best: bool,
    pub seasonal_price: Option<f64>,
}

impl Hotel {
    /// Compare all offers and pick the cheapest.
    ///
    /// Ties go to the first listed website. Returns `None` when the hotel
    /// has no offers at all.
    pub fn compare_prices(&self) -> Option<SortedHotel> {
        let (best_idx, best) = self.prices.iter().enumerate().fold(
            None::<(usize, &HotelPrice)>,
            |acc, (idx, offer)| match acc {
                Some((_, current)) if current.effective_price() <= offer.effective_price() => acc,
                _ => Some((idx, offer)),
            },
        )?;

        let comparison_steps = self
            .prices
            .iter()
            .enumerate()
            .map(|(idx, offer)| ComparisonStep {
                website: offer.website.clone(),
                price: offer.price,
                is_best: idx == best_idx,
                seasonal_price: offer.seasonal_price,
            })
            .collect();

        Some(SortedHotel {
            best_price: best.effective_price(),
            best_website: best.website.clone(),
            seasonal_discount: best.seasonal_discount,
            comparison_steps,
            hotel: self.clone(),
        })
    }
}

/// Search box suggestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchLocation {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub location_type: LocationType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationType {
    City,
    Hotel,
}

impl LocationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LocationType::City => "city",
            LocationType::Hotel => "hotel",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offer(website: &str, price: f64, seasonal: Option<f64>) -> HotelPrice {
        HotelPrice {
            website: website.to_string(),
            price,
            seasonal_price: seasonal,
            seasonal_discount: seasonal.map(|s| ((price - s) / price * 100.0).round()),
        }
    }

    fn hotel(prices: Vec<HotelPrice>) -> Hotel {
        Hotel {
            id: "h1".to_string(),
            name: "Harbor View".to_string(),
            location: "Monterey".to_string(),
            image: "/img/harbor.jpg".to_string(),
            prices,
            rating: 4.5,
            amenities: vec![],
            description: None,
            pet_friendly: false,
            pet_fee: None,
            seasonal_notes: None,
            coordinates: None,
        }
    }

    #[test]
    fn test_seasonal_price_wins_over_base() {
        let h = hotel(vec![
            offer("Booking.com", 200.0, None),
            offer("Expedia", 210.0, Some(180.0)),
        ]);
        let sorted = h.compare_prices().unwrap();

        assert_eq!(sorted.best_price, 180.0);
        assert_eq!(sorted.best_website, "Expedia");
        assert_eq!(sorted.seasonal_discount, Some(14.0));
        assert!(!sorted.comparison_steps[0].is_best);
        assert!(sorted.comparison_steps[1].is_best);
    }

    #[test]
    fn test_tie_goes_to_first_listed() {
        let h = hotel(vec![
            offer("Hotels.com", 150.0, None),
            offer("Agoda", 150.0, None),
        ]);
        let sorted = h.compare_prices().unwrap();

        assert_eq!(sorted.best_website, "Hotels.com");
        let best_count = sorted.comparison_steps.iter().filter(|s| s.is_best).count();
        assert_eq!(best_count, 1);
    }

    #[test]
    fn test_no_offers() {
        assert!(hotel(vec![]).compare_prices().is_none());
    }
}
