//! Diesel table definitions for the tasting schema.
//!
//! These must match `backend/migrations` exactly. `diesel print-schema`
//! against a migrated database regenerates them.

diesel::table! {
    /// Users resolved from external identity subjects.
    app_users (id) {
        id -> Uuid,
        /// External subject; unique.
        subject -> Text,
        email -> Nullable<Text>,
        nickname -> Nullable<Varchar>,
        created_at -> Timestamptz,
        last_seen_at -> Timestamptz,
    }
}

diesel::table! {
    /// Tasting events. `join_code` is unique.
    events (id) {
        id -> Uuid,
        owner_user_id -> Uuid,
        name -> Varchar,
        /// One of `draft`, `open`, `closed`, `archived`.
        status -> Text,
        /// One of `private`, `open`.
        visibility -> Text,
        is_listed -> Bool,
        join_code -> Varchar,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// One row per (event, user).
    event_participants (event_id, user_id) {
        event_id -> Uuid,
        user_id -> Uuid,
        /// One of `owner`, `member`.
        role -> Text,
        /// One of `invited`, `active`, `removed`.
        status -> Text,
        joined_at -> Timestamptz,
        removed_at -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    /// Beers logged against an event.
    event_beers (id) {
        id -> Uuid,
        event_id -> Uuid,
        name -> Varchar,
        brewery -> Nullable<Varchar>,
        style -> Nullable<Varchar>,
        abv -> Nullable<Float8>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Reviews; unique per (event, beer, user) with an optimistic version.
    beer_reviews (id) {
        id -> Uuid,
        event_id -> Uuid,
        beer_id -> Uuid,
        user_id -> Uuid,
        color_score -> Int2,
        smell_score -> Int2,
        taste_score -> Int2,
        total_score -> Int2,
        notes -> Nullable<Varchar>,
        aroma_notes -> Nullable<Varchar>,
        appearance_notes -> Nullable<Varchar>,
        flavor_notes -> Nullable<Varchar>,
        version -> Int4,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Favourite marks; unique per (user, beer).
    beer_favorites (user_id, beer_id) {
        event_id -> Uuid,
        beer_id -> Uuid,
        user_id -> Uuid,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(events -> app_users (owner_user_id));
diesel::joinable!(event_participants -> events (event_id));
diesel::joinable!(event_participants -> app_users (user_id));
diesel::joinable!(event_beers -> events (event_id));
diesel::joinable!(beer_reviews -> event_beers (beer_id));
diesel::joinable!(beer_favorites -> event_beers (beer_id));

diesel::allow_tables_to_appear_in_same_query!(
    app_users,
    events,
    event_participants,
    event_beers,
    beer_reviews,
    beer_favorites,
);
