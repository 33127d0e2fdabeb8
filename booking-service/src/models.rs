use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use booking_core::{BookingError, BookingStatus};

#[derive(Debug, Clone, Queryable, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::users)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub full_name: String,
    pub phone_number: Option<String>,
    pub birthday: NaiveDate,
    pub gender: String,
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::schema::users)]
pub struct NewUser {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub full_name: String,
    pub phone_number: Option<String>,
    pub birthday: NaiveDate,
    pub gender: String,
}

#[derive(Debug, Clone, Queryable, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::hotels)]
pub struct Hotel {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub address: String,
    pub city: String,
    pub country: String,
    pub star_rating: i32,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::rooms)]
pub struct Room {
    pub id: Uuid,
    pub hotel_id: Uuid,
    pub room_number: String,
    pub price: BigDecimal,
    pub discount_price: Option<BigDecimal>,
    pub capacity: i32,
    pub room_size: Option<i32>,
    pub is_available: bool,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Room {
    /// Rate snapshotted into new bookings. `discount_price` is a display
    /// field on room listings and never enters billing.
    pub fn nightly_rate(&self) -> &BigDecimal {
        &self.price
    }
}

#[derive(Debug, Clone, Queryable, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::bookings)]
pub struct Booking {
    pub id: Uuid,
    pub booking_code: String,
    pub user_id: Uuid,
    pub room_id: Uuid,
    pub check_in_date: NaiveDate,
    pub check_out_date: NaiveDate,
    pub guests: i32,
    pub total_price: BigDecimal,
    pub status: String,
    pub special_requests: Option<String>,
    pub cancellation_reason: Option<String>,
    pub payment_ref: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    pub fn parsed_status(&self) -> Result<BookingStatus, BookingError> {
        self.status.parse()
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::schema::bookings)]
pub struct NewBooking {
    pub id: Uuid,
    pub booking_code: String,
    pub user_id: Uuid,
    pub room_id: Uuid,
    pub check_in_date: NaiveDate,
    pub check_out_date: NaiveDate,
    pub guests: i32,
    pub total_price: BigDecimal,
    pub status: String,
    pub special_requests: Option<String>,
}

#[derive(Debug, Clone, Queryable, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::payment_cards)]
pub struct PaymentCard {
    pub id: Uuid,
    pub user_id: Uuid,
    pub card_holder_name: String,
    pub card_brand: String,
    pub card_number: String,
    pub exp_month: i32,
    pub exp_year: i32,
    pub balance: BigDecimal,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::schema::payment_cards)]
pub struct NewPaymentCard {
    pub id: Uuid,
    pub user_id: Uuid,
    pub card_holder_name: String,
    pub card_brand: String,
    pub card_number: String,
    pub exp_month: i32,
    pub exp_year: i32,
    pub is_default: bool,
}

#[derive(Debug, Clone, Queryable, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::reviews)]
pub struct Review {
    pub id: Uuid,
    pub user_id: Uuid,
    pub hotel_id: Uuid,
    pub room_id: Option<Uuid>,
    pub rating: i32,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::schema::reviews)]
pub struct NewReview {
    pub id: Uuid,
    pub user_id: Uuid,
    pub hotel_id: Uuid,
    pub room_id: Option<Uuid>,
    pub rating: i32,
    pub comment: Option<String>,
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn room(price: &str, discount: Option<&str>) -> Room {
        let now = Utc::now();
        Room {
            id: Uuid::new_v4(),
            hotel_id: Uuid::new_v4(),
            room_number: "101".to_string(),
            price: BigDecimal::from_str(price).unwrap(),
            discount_price: discount.map(|d| BigDecimal::from_str(d).unwrap()),
            capacity: 2,
            room_size: None,
            is_available: true,
            description: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn discounted_rooms_still_bill_the_regular_price() {
        let room = room("120.00", Some("99.50"));
        assert_eq!(
            room.nightly_rate(),
            &BigDecimal::from_str("120.00").unwrap()
        );
    }

    #[test]
    fn nightly_rate_is_the_room_price() {
        let room = room("80.00", None);
        assert_eq!(room.nightly_rate(), &room.price);
    }
}
