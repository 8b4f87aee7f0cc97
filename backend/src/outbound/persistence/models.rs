//! Diesel row structs. Internal to the persistence layer; repositories convert
//! them to domain types before returning.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{answers, notifications, questions, users};

/// Row read from `users`, password hash included.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub name: &'a str,
    pub email: &'a str,
    pub role: &'a str,
    pub password_hash: &'a str,
    pub created_at: DateTime<Utc>,
}

/// Row read from `questions`. Also loadable from raw SQL.
#[derive(Debug, Clone, Queryable, QueryableByName, Selectable)]
#[diesel(table_name = questions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct QuestionRow {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub author_id: Uuid,
    pub tags: Vec<String>,
    pub votes: i64,
    pub views: i64,
    pub answer_ids: Vec<Uuid>,
    pub accepted_answer: Option<Uuid>,
    pub is_closed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = questions)]
pub(crate) struct NewQuestionRow<'a> {
    pub id: Uuid,
    pub title: &'a str,
    pub description: &'a str,
    pub author_id: Uuid,
    pub tags: Vec<&'a str>,
    pub votes: i64,
    pub views: i64,
    pub answer_ids: &'a [Uuid],
    pub accepted_answer: Option<Uuid>,
    pub is_closed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Row read from `answers`. Also loadable from raw SQL.
#[derive(Debug, Clone, Queryable, QueryableByName, Selectable)]
#[diesel(table_name = answers)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct AnswerRow {
    pub id: Uuid,
    pub content: String,
    pub question_id: Uuid,
    pub owner_id: Uuid,
    pub votes: i64,
    pub accepted: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = answers)]
pub(crate) struct NewAnswerRow<'a> {
    pub id: Uuid,
    pub content: &'a str,
    pub question_id: Uuid,
    pub owner_id: Uuid,
    pub votes: i64,
    pub accepted: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = notifications)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct NotificationRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub kind: String,
    pub message: String,
    pub read: bool,
    pub related_question_id: Option<Uuid>,
    pub related_answer_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = notifications)]
pub(crate) struct NewNotificationRow<'a> {
    pub id: Uuid,
    pub user_id: Uuid,
    pub kind: &'a str,
    pub message: &'a str,
    pub read: bool,
    pub related_question_id: Option<Uuid>,
    pub related_answer_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}
