diesel::table! {
    users (id) {
        id -> Uuid,
        email -> Varchar,
        password_hash -> Varchar,
        full_name -> Varchar,
        phone_number -> Nullable<Varchar>,
        birthday -> Date,
        gender -> Varchar,
        avatar_url -> Nullable<Varchar>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    hotels (id) {
        id -> Uuid,
        name -> Varchar,
        description -> Nullable<Text>,
        address -> Varchar,
        city -> Varchar,
        country -> Varchar,
        star_rating -> Int4,
        latitude -> Nullable<Float8>,
        longitude -> Nullable<Float8>,
        contact_email -> Nullable<Varchar>,
        contact_phone -> Nullable<Varchar>,
        image_url -> Nullable<Varchar>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    rooms (id) {
        id -> Uuid,
        hotel_id -> Uuid,
        room_number -> Varchar,
        price -> Numeric,
        discount_price -> Nullable<Numeric>,
        capacity -> Int4,
        room_size -> Nullable<Int4>,
        is_available -> Bool,
        description -> Nullable<Text>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    bookings (id) {
        id -> Uuid,
        booking_code -> Varchar,
        user_id -> Uuid,
        room_id -> Uuid,
        check_in_date -> Date,
        check_out_date -> Date,
        guests -> Int4,
        total_price -> Numeric,
        status -> Varchar,
        special_requests -> Nullable<Varchar>,
        cancellation_reason -> Nullable<Varchar>,
        payment_ref -> Nullable<Uuid>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    payment_cards (id) {
        id -> Uuid,
        user_id -> Uuid,
        card_holder_name -> Varchar,
        card_brand -> Varchar,
        card_number -> Varchar,
        exp_month -> Int4,
        exp_year -> Int4,
        balance -> Numeric,
        is_default -> Bool,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    reviews (id) {
        id -> Uuid,
        user_id -> Uuid,
        hotel_id -> Uuid,
        room_id -> Nullable<Uuid>,
        rating -> Int4,
        comment -> Nullable<Text>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::joinable!(rooms -> hotels (hotel_id));
diesel::joinable!(bookings -> users (user_id));
diesel::joinable!(bookings -> rooms (room_id));
diesel::joinable!(payment_cards -> users (user_id));
diesel::joinable!(reviews -> hotels (hotel_id));

diesel::allow_tables_to_appear_in_same_query!(
    users,
    hotels,
    rooms,
    bookings,
    payment_cards,
    reviews,
);
