//! PostgreSQL-backed `AnswerRepository`.

use async_trait::async_trait;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::sql_types::BigInt;
use diesel_async::AsyncConnection as _;
use diesel_async::RunQueryDsl;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use pagination::Page;
use uuid::Uuid;

use crate::domain::ports::{AnswerRepository, AnswerRepositoryError};
use crate::domain::{
    Answer, AnswerContent, AnswerId, AnswerListQuery, AnswerSort, QuestionId, UserId,
};

use super::diesel_helpers::{count_to_u64, map_diesel_error, map_pool_error, page_window};
use super::models::{AnswerRow, NewAnswerRow};
use super::pool::{DbPool, PoolError};
use super::schema::answers;

const UNLINKED_SQL: &str = "SELECT a.id, a.content, a.question_id, a.owner_id, \
            a.votes, a.accepted, a.created_at \
     FROM answers a \
     JOIN questions q ON q.id = a.question_id \
     WHERE NOT (a.id = ANY(q.answer_ids)) \
     ORDER BY a.created_at ASC, a.id ASC \
     LIMIT $1";

/// Diesel implementation of [`AnswerRepository`].
#[derive(Clone)]
pub struct DieselAnswerRepository {
    pool: DbPool,
}

impl DieselAnswerRepository {
    /// Repository over `pool`.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn pool_error(error: PoolError) -> AnswerRepositoryError {
    map_pool_error(error, AnswerRepositoryError::connection)
}

fn diesel_error(error: diesel::result::Error) -> AnswerRepositoryError {
    map_diesel_error(
        error,
        AnswerRepositoryError::query,
        AnswerRepositoryError::connection,
    )
}

fn row_to_answer(row: AnswerRow) -> Result<Answer, AnswerRepositoryError> {
    let content = AnswerContent::new(&row.content).map_err(|err| {
        AnswerRepositoryError::query(format!("stored answer {}: {err}", row.id))
    })?;
    Ok(Answer {
        id: AnswerId::from_uuid(row.id),
        content,
        question_id: QuestionId::from_uuid(row.question_id),
        owner_id: UserId::from_uuid(row.owner_id),
        votes: row.votes,
        accepted: row.accepted,
        created_at: row.created_at,
    })
}

fn rows_to_answers(rows: Vec<AnswerRow>) -> Result<Vec<Answer>, AnswerRepositoryError> {
    rows.into_iter().map(row_to_answer).collect()
}

fn for_question(question_id: Uuid) -> answers::BoxedQuery<'static, Pg> {
    answers::table
        .filter(answers::question_id.eq(question_id))
        .into_boxed()
}

fn ordered(
    statement: answers::BoxedQuery<'static, Pg>,
    sort: AnswerSort,
) -> answers::BoxedQuery<'static, Pg> {
    match sort {
        AnswerSort::Newest => statement.order_by((answers::created_at.desc(), answers::id.desc())),
        AnswerSort::Oldest => statement.order_by((answers::created_at.asc(), answers::id.asc())),
        AnswerSort::MostVoted => statement.order_by((
            answers::votes.desc(),
            answers::created_at.desc(),
            answers::id.desc(),
        )),
        AnswerSort::Accepted => statement.order_by((
            answers::accepted.desc(),
            answers::created_at.desc(),
            answers::id.desc(),
        )),
    }
}

#[async_trait]
impl AnswerRepository for DieselAnswerRepository {
    async fn insert(&self, answer: &Answer) -> Result<(), AnswerRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let row = NewAnswerRow {
            id: *answer.id.as_uuid(),
            content: answer.content.as_ref(),
            question_id: *answer.question_id.as_uuid(),
            owner_id: *answer.owner_id.as_uuid(),
            votes: answer.votes,
            accepted: answer.accepted,
            created_at: answer.created_at,
        };
        diesel::insert_into(answers::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map_err(diesel_error)?;
        Ok(())
    }

    async fn find_by_id(&self, id: &AnswerId) -> Result<Option<Answer>, AnswerRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        answers::table
            .find(*id.as_uuid())
            .select(AnswerRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?
            .map(row_to_answer)
            .transpose()
    }

    async fn find_by_ids(&self, ids: &[AnswerId]) -> Result<Vec<Answer>, AnswerRepositoryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let uuids: Vec<Uuid> = ids.iter().map(|id| *id.as_uuid()).collect();
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let rows = answers::table
            .filter(answers::id.eq_any(uuids))
            .select(AnswerRow::as_select())
            .load(&mut conn)
            .await
            .map_err(diesel_error)?;
        rows_to_answers(rows)
    }

    async fn list_for_question(
        &self,
        query: &AnswerListQuery,
    ) -> Result<Page<Answer>, AnswerRepositoryError> {
        let question_id = *query.question_id.as_uuid();
        let sort = query.sort;
        let (limit, offset) = page_window(query.page);
        let mut conn = self.pool.get().await.map_err(pool_error)?;

        let (total, rows) = conn
            .transaction(|conn| {
                async move {
                    let total: i64 = for_question(question_id).count().get_result(conn).await?;
                    let rows: Vec<AnswerRow> = ordered(for_question(question_id), sort)
                        .select(AnswerRow::as_select())
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

        Ok(Page::new(
            rows_to_answers(rows)?,
            query.page,
            count_to_u64(total),
        ))
    }

    async fn apply_vote(
        &self,
        id: &AnswerId,
        delta: i64,
    ) -> Result<Option<Answer>, AnswerRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        diesel::update(answers::table.find(*id.as_uuid()))
            .set(answers::votes.eq(answers::votes + delta))
            .returning(AnswerRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?
            .map(row_to_answer)
            .transpose()
    }

    async fn mark_accepted(
        &self,
        question_id: &QuestionId,
        id: &AnswerId,
    ) -> Result<Option<Answer>, AnswerRepositoryError> {
        let question_id = *question_id.as_uuid();
        let answer_id = *id.as_uuid();
        let mut conn = self.pool.get().await.map_err(pool_error)?;

        let accepted = conn
            .transaction(|conn| {
                async move {
                    let accepted: Option<AnswerRow> = diesel::update(
                        answers::table
                            .filter(answers::id.eq(answer_id))
                            .filter(answers::question_id.eq(question_id)),
                    )
                    .set(answers::accepted.eq(true))
                    .returning(AnswerRow::as_returning())
                    .get_result(conn)
                    .await
                    .optional()?;
                    if accepted.is_some() {
                        diesel::update(
                            answers::table
                                .filter(answers::question_id.eq(question_id))
                                .filter(answers::id.ne(answer_id)),
                        )
                        .set(answers::accepted.eq(false))
                        .execute(conn)
                        .await?;
                    }
                    Ok(accepted)
                }
                .scope_boxed()
            })
            .await
            .map_err(diesel_error)?;

        accepted.map(row_to_answer).transpose()
    }

    async fn find_unlinked(&self, limit: u32) -> Result<Vec<Answer>, AnswerRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let rows: Vec<AnswerRow> = diesel::sql_query(UNLINKED_SQL)
            .bind::<BigInt, _>(i64::from(limit))
            .load(&mut conn)
            .await
            .map_err(diesel_error)?;
        rows_to_answers(rows)
    }
}
