//! Diesel table definitions mirroring the PostgreSQL schema.

diesel::table! {
    users (id) {
        id -> Int4,
        username -> Varchar,
        email -> Varchar,
        password_hash -> Varchar,
        role -> Varchar,
        domain_id -> Nullable<Int4>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    domains (id) {
        id -> Int4,
        name -> Varchar,
        color -> Varchar,
    }
}

diesel::table! {
    news (id) {
        id -> Int4,
        title -> Varchar,
        content -> Text,
        domain_id -> Int4,
        author_id -> Int4,
        date -> Timestamptz,
        editors -> Array<Text>,
        likes_count -> Int4,
        archived -> Bool,
        pending_validation -> Bool,
        validated_by -> Nullable<Int4>,
        validated_at -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    news_likes (id) {
        id -> Int4,
        news_id -> Int4,
        ip_address -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    subscribers (id) {
        id -> Int4,
        email -> Varchar,
        name -> Varchar,
        subscribed_at -> Timestamptz,
    }
}

diesel::table! {
    audit_log (id) {
        id -> Int4,
        user_id -> Int4,
        action -> Varchar,
        timestamp -> Timestamptz,
        ip_address -> Nullable<Varchar>,
        user_agent -> Nullable<Text>,
    }
}

diesel::joinable!(users -> domains (domain_id));
diesel::joinable!(news -> domains (domain_id));
diesel::joinable!(news_likes -> news (news_id));
diesel::joinable!(audit_log -> users (user_id));

diesel::allow_tables_to_appear_in_same_query!(
    users,
    domains,
    news,
    news_likes,
    subscribers,
    audit_log
);
