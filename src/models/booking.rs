// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Booking rows and guest composition.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A stay booked by a user. Read-only from this application's side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub id: String,
    pub user_id: String,
    pub hotel_id: String,
    pub hotel_name: String,
    pub check_in: DateTime<Utc>,
    pub check_out: DateTime<Utc>,
    pub guests: GuestInfo,
    pub total_price: f64,
    pub status: BookingStatus,
    pub booking_date: DateTime<Utc>,
    /// Seasonal discount applied, in percent
    #[serde(default)]
    pub seasonal_discount: Option<f64>,
    #[serde(default)]
    pub pet_fee: Option<f64>,
}

impl Booking {
    /// Number of nights in the stay (zero if the interval is inverted).
    pub fn nights(&self) -> i64 {
        (self.check_out.date_naive() - self.check_in.date_naive())
            .num_days()
            .max(0)
    }
}

/// Booking lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Confirmed,
    Completed,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Completed => "completed",
            BookingStatus::Cancelled => "cancelled",
        }
    }
}

/// Who is travelling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuestInfo {
    pub adults: u32,
    #[serde(default)]
    pub children: Vec<Child>,
    #[serde(default)]
    pub pets: Vec<Pet>,
}

impl Default for GuestInfo {
    fn default() -> Self {
        Self {
            adults: 2,
            children: Vec::new(),
            pets: Vec::new(),
        }
    }
}

impl GuestInfo {
    /// Adults plus children.
    pub fn total_guests(&self) -> u32 {
        self.adults + self.children.len() as u32
    }

    pub fn pet_count(&self) -> u32 {
        self.pets.iter().map(|p| p.count).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Child {
    pub id: String,
    pub age: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pet {
    pub id: String,
    #[serde(rename = "type")]
    pub pet_type: PetType,
    pub count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PetType {
    Dog,
    Cat,
    Other,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_booking_row_deserializes() {
        let row = serde_json::json!({
            "id": "b1",
            "user_id": "u1",
            "hotel_id": "h1",
            "hotel_name": "Seaside Inn",
            "check_in": "2026-07-01T15:00:00Z",
            "check_out": "2026-07-04T11:00:00Z",
            "guests": {
                "adults": 2,
                "children": [{"id": "c1", "age": 7}],
                "pets": [{"id": "p1", "type": "dog", "count": 1}]
            },
            "total_price": 540.0,
            "status": "confirmed",
            "booking_date": "2026-05-10T09:30:00Z",
            "pet_fee": 25.0
        });

        let booking: Booking = serde_json::from_value(row).unwrap();
        assert_eq!(booking.status, BookingStatus::Confirmed);
        assert_eq!(booking.nights(), 3);
        assert_eq!(booking.guests.total_guests(), 3);
        assert_eq!(booking.guests.pet_count(), 1);
        assert_eq!(booking.guests.pets[0].pet_type, PetType::Dog);
        assert_eq!(booking.seasonal_discount, None);
        assert_eq!(booking.pet_fee, Some(25.0));
    }

    #[test]
    fn test_unknown_status_rejected() {
        let err = serde_json::from_value::<BookingStatus>(serde_json::json!("pending"));
        assert!(err.is_err());
    }
}
