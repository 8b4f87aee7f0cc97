//! PostgreSQL-backed `QuestionRepository`.
//!
//! Counter and back-reference updates are single `UPDATE` statements so
//! concurrent requests never overwrite each other's increments.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::dsl::sql;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::sql_types::{Bool, Text, Timestamptz};
use diesel_async::AsyncConnection as _;
use diesel_async::RunQueryDsl;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use pagination::Page;
use uuid::Uuid;

use crate::domain::ports::{QuestionRepository, QuestionRepositoryError};
use crate::domain::{
    AnswerId, Question, QuestionDescription, QuestionId, QuestionListQuery, QuestionSort,
    QuestionTitle, Tag, UserId,
};

use super::diesel_helpers::{
    contains_pattern, count_to_u64, map_diesel_error, map_pool_error, page_window,
};
use super::models::{NewQuestionRow, QuestionRow};
use super::pool::{DbPool, PoolError};
use super::schema::questions;

const APPEND_ANSWER_SQL: &str = "UPDATE questions \
     SET answer_ids = CASE WHEN $1 = ANY(answer_ids) THEN answer_ids \
                           ELSE array_append(answer_ids, $1) END, \
         updated_at = $2 \
     WHERE id = $3";

/// Diesel implementation of [`QuestionRepository`].
#[derive(Clone)]
pub struct DieselQuestionRepository {
    pool: DbPool,
}

impl DieselQuestionRepository {
    /// Repository over `pool`.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn pool_error(error: PoolError) -> QuestionRepositoryError {
    map_pool_error(error, QuestionRepositoryError::connection)
}

fn diesel_error(error: diesel::result::Error) -> QuestionRepositoryError {
    map_diesel_error(
        error,
        QuestionRepositoryError::query,
        QuestionRepositoryError::connection,
    )
}

fn row_to_question(row: QuestionRow) -> Result<Question, QuestionRepositoryError> {
    let invalid = |err: crate::domain::QuestionValidationError| {
        QuestionRepositoryError::query(format!("stored question {}: {err}", row.id))
    };
    Ok(Question {
        id: QuestionId::from_uuid(row.id),
        title: QuestionTitle::new(&row.title).map_err(invalid)?,
        description: QuestionDescription::new(&row.description).map_err(invalid)?,
        author_id: UserId::from_uuid(row.author_id),
        tags: row.tags.iter().filter_map(|tag| Tag::parse(tag)).collect(),
        votes: row.votes,
        views: row.views,
        answer_ids: row.answer_ids.into_iter().map(AnswerId::from_uuid).collect(),
        accepted_answer: row.accepted_answer.map(AnswerId::from_uuid),
        is_closed: row.is_closed,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

fn filtered(query: &QuestionListQuery) -> questions::BoxedQuery<'static, Pg> {
    let mut statement = questions::table.into_boxed();
    if query.sort == QuestionSort::Unanswered {
        statement = statement.filter(sql::<Bool>("cardinality(answer_ids) = 0"));
    }
    if let Some(term) = query.search() {
        let pattern = contains_pattern(term);
        statement = statement.filter(
            questions::title
                .ilike(pattern.clone())
                .or(questions::description.ilike(pattern.clone()))
                .or(sql::<Bool>("array_to_string(tags, chr(31)) ILIKE ")
                    .bind::<Text, _>(pattern)),
        );
    }
    statement
}

fn ordered(
    statement: questions::BoxedQuery<'static, Pg>,
    sort: QuestionSort,
) -> questions::BoxedQuery<'static, Pg> {
    match sort {
        QuestionSort::Newest | QuestionSort::Unanswered => {
            statement.order_by((questions::created_at.desc(), questions::id.desc()))
        }
        QuestionSort::Oldest => {
            statement.order_by((questions::created_at.asc(), questions::id.asc()))
        }
        QuestionSort::MostVoted => statement.order_by((
            questions::votes.desc(),
            questions::created_at.desc(),
            questions::id.desc(),
        )),
    }
}

fn updated_question(
    result: QueryResult<QuestionRow>,
) -> Result<Option<Question>, QuestionRepositoryError> {
    result
        .optional()
        .map_err(diesel_error)?
        .map(row_to_question)
        .transpose()
}

#[async_trait]
impl QuestionRepository for DieselQuestionRepository {
    async fn insert(&self, question: &Question) -> Result<(), QuestionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let answer_ids: Vec<Uuid> = question.answer_ids.iter().map(|id| *id.as_uuid()).collect();
        let row = NewQuestionRow {
            id: *question.id.as_uuid(),
            title: question.title.as_ref(),
            description: question.description.as_ref(),
            author_id: *question.author_id.as_uuid(),
            tags: question.tags.iter().map(AsRef::as_ref).collect(),
            votes: question.votes,
            views: question.views,
            answer_ids: &answer_ids,
            accepted_answer: question.accepted_answer.map(|id| *id.as_uuid()),
            is_closed: question.is_closed,
            created_at: question.created_at,
            updated_at: question.updated_at,
        };
        diesel::insert_into(questions::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map_err(diesel_error)?;
        Ok(())
    }

    async fn find_by_id(
        &self,
        id: &QuestionId,
    ) -> Result<Option<Question>, QuestionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        questions::table
            .find(*id.as_uuid())
            .select(QuestionRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?
            .map(row_to_question)
            .transpose()
    }

    async fn find_by_ids(
        &self,
        ids: &[QuestionId],
    ) -> Result<Vec<Question>, QuestionRepositoryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let uuids: Vec<Uuid> = ids.iter().map(|id| *id.as_uuid()).collect();
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let rows: Vec<QuestionRow> = questions::table
            .filter(questions::id.eq_any(uuids))
            .select(QuestionRow::as_select())
            .load(&mut conn)
            .await
            .map_err(diesel_error)?;
        rows.into_iter().map(row_to_question).collect()
    }

    async fn list(
        &self,
        query: &QuestionListQuery,
    ) -> Result<Page<Question>, QuestionRepositoryError> {
        let (limit, offset) = page_window(query.page);
        let mut conn = self.pool.get().await.map_err(pool_error)?;

        // Count and page inside one transaction so both see the same rows.
        let (total, rows) = conn
            .transaction(|conn| {
                async move {
                    let total: i64 = filtered(query).count().get_result(conn).await?;
                    let rows: Vec<QuestionRow> = ordered(filtered(query), query.sort)
                        .select(QuestionRow::as_select())
                        .limit(limit)
                        .offset(offset)
                        .load(conn)
                        .await?;
                    Ok((total, rows))
                }
                .scope_boxed()
            })
            .await
            .map_err(diesel_error)?;

        let items = rows
            .into_iter()
            .map(row_to_question)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page::new(items, query.page, count_to_u64(total)))
    }

    async fn record_view(
        &self,
        id: &QuestionId,
    ) -> Result<Option<Question>, QuestionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let viewed = updated_question(
            diesel::update(questions::table.find(*id.as_uuid()))
                .set(questions::views.eq(questions::views + 1))
                .returning(QuestionRow::as_returning())
                .get_result(&mut conn)
                .await,
        )?;
        // RETURNING reports the new row; callers see the count before this view.
        Ok(viewed.map(|mut question| {
            question.views -= 1;
            question
        }))
    }

    async fn append_answer(
        &self,
        id: &QuestionId,
        answer_id: &AnswerId,
        at: DateTime<Utc>,
    ) -> Result<bool, QuestionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let updated = diesel::sql_query(APPEND_ANSWER_SQL)
            .bind::<diesel::sql_types::Uuid, _>(*answer_id.as_uuid())
            .bind::<Timestamptz, _>(at)
            .bind::<diesel::sql_types::Uuid, _>(*id.as_uuid())
            .execute(&mut conn)
            .await
            .map_err(diesel_error)?;
        Ok(updated > 0)
    }

    async fn close(
        &self,
        id: &QuestionId,
        at: DateTime<Utc>,
    ) -> Result<Option<Question>, QuestionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        updated_question(
            diesel::update(questions::table.find(*id.as_uuid()))
                .set((questions::is_closed.eq(true), questions::updated_at.eq(at)))
                .returning(QuestionRow::as_returning())
                .get_result(&mut conn)
                .await,
        )
    }

    async fn set_accepted_answer(
        &self,
        id: &QuestionId,
        answer_id: &AnswerId,
        at: DateTime<Utc>,
    ) -> Result<Option<Question>, QuestionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        updated_question(
            diesel::update(questions::table.find(*id.as_uuid()))
                .set((
                    questions::accepted_answer.eq(Some(*answer_id.as_uuid())),
                    questions::updated_at.eq(at),
                ))
                .returning(QuestionRow::as_returning())
                .get_result(&mut conn)
                .await,
        )
    }
}
