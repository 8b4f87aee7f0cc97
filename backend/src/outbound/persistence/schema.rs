//! Diesel table definitions mirroring `migrations/`.
//!
//! Keep in step with the SQL by hand or regenerate with
//! `diesel print-schema` against a migrated database.

diesel::table! {
    /// Registered accounts. `email` is stored lowercase and is unique.
    users (id) {
        id -> Uuid,
        name -> Varchar,
        email -> Varchar,
        role -> Varchar,
        password_hash -> Text,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Questions with their counters and the answer back-reference list.
    questions (id) {
        id -> Uuid,
        title -> Varchar,
        description -> Text,
        author_id -> Uuid,
        tags -> Array<Text>,
        votes -> Int8,
        views -> Int8,
        answer_ids -> Array<Uuid>,
        accepted_answer -> Nullable<Uuid>,
        is_closed -> Bool,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Answers; `question_id` is the authoritative link to the question.
    answers (id) {
        id -> Uuid,
        content -> Text,
        question_id -> Uuid,
        owner_id -> Uuid,
        votes -> Int8,
        accepted -> Bool,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Per-user notifications. Related ids are loose references.
    notifications (id) {
        id -> Uuid,
        user_id -> Uuid,
        kind -> Varchar,
        message -> Text,
        read -> Bool,
        related_question_id -> Nullable<Uuid>,
        related_answer_id -> Nullable<Uuid>,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(questions -> users (author_id));
diesel::joinable!(answers -> questions (question_id));
diesel::joinable!(notifications -> users (user_id));

diesel::allow_tables_to_appear_in_same_query!(users, questions, answers, notifications);
