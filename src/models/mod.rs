// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the application.

pub mod booking;
pub mod hotel;
pub mod identity;
pub mod profile;
pub mod user;

pub use booking::{Booking, BookingStatus, Child, GuestInfo, Pet, PetType};
pub use hotel::{
    ComparisonStep, Coordinates, Hotel, HotelPrice, LocationType, SearchLocation, SortedHotel,
};
pub use identity::{Identity, UserMetadata};
pub use profile::{NewProfile, Profile};
pub use user::User;
