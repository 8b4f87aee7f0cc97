//! In-memory `AnswerRepository`.

use std::cmp::Ordering;

use async_trait::async_trait;
use pagination::Page;

use crate::domain::ports::{AnswerRepository, AnswerRepositoryError};
use crate::domain::{Answer, AnswerId, AnswerListQuery, AnswerSort, QuestionId};

use super::{MemoryStore, paginate};

fn newest_first(a: &Answer, b: &Answer) -> Ordering {
    b.created_at
        .cmp(&a.created_at)
        .then_with(|| b.id.cmp(&a.id))
}

fn oldest_first(a: &Answer, b: &Answer) -> Ordering {
    a.created_at
        .cmp(&b.created_at)
        .then_with(|| a.id.cmp(&b.id))
}

fn compare_answers(sort: AnswerSort, a: &Answer, b: &Answer) -> Ordering {
    match sort {
        AnswerSort::Newest => newest_first(a, b),
        AnswerSort::Oldest => oldest_first(a, b),
        AnswerSort::MostVoted => b.votes.cmp(&a.votes).then_with(|| newest_first(a, b)),
        AnswerSort::Accepted => b
            .accepted
            .cmp(&a.accepted)
            .then_with(|| newest_first(a, b)),
    }
}

/// Answers held in a [`MemoryStore`].
#[derive(Clone)]
pub struct MemoryAnswerRepository {
    store: MemoryStore,
}

impl MemoryAnswerRepository {
    /// View over `store`.
    pub fn new(store: MemoryStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl AnswerRepository for MemoryAnswerRepository {
    async fn insert(&self, answer: &Answer) -> Result<(), AnswerRepositoryError> {
        let mut tables = self.store.lock().map_err(AnswerRepositoryError::query)?;
        tables.answers.insert(answer.id, answer.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &AnswerId) -> Result<Option<Answer>, AnswerRepositoryError> {
        let tables = self.store.lock().map_err(AnswerRepositoryError::query)?;
        Ok(tables.answers.get(id).cloned())
    }

    async fn find_by_ids(&self, ids: &[AnswerId]) -> Result<Vec<Answer>, AnswerRepositoryError> {
        let tables = self.store.lock().map_err(AnswerRepositoryError::query)?;
        Ok(ids
            .iter()
            .filter_map(|id| tables.answers.get(id).cloned())
            .collect())
    }

    async fn list_for_question(
        &self,
        query: &AnswerListQuery,
    ) -> Result<Page<Answer>, AnswerRepositoryError> {
        let tables = self.store.lock().map_err(AnswerRepositoryError::query)?;
        let mut answers: Vec<Answer> = tables
            .answers
            .values()
            .filter(|answer| answer.question_id == query.question_id)
            .cloned()
            .collect();
        drop(tables);
        answers.sort_by(|a, b| compare_answers(query.sort, a, b));
        Ok(paginate(answers, query.page))
    }

    async fn apply_vote(
        &self,
        id: &AnswerId,
        delta: i64,
    ) -> Result<Option<Answer>, AnswerRepositoryError> {
        let mut tables = self.store.lock().map_err(AnswerRepositoryError::query)?;
        Ok(tables.answers.get_mut(id).map(|answer| {
            answer.votes += delta;
            answer.clone()
        }))
    }

    async fn mark_accepted(
        &self,
        question_id: &QuestionId,
        id: &AnswerId,
    ) -> Result<Option<Answer>, AnswerRepositoryError> {
        let mut tables = self.store.lock().map_err(AnswerRepositoryError::query)?;
        let belongs = tables
            .answers
            .get(id)
            .is_some_and(|answer| answer.question_id == *question_id);
        if !belongs {
            return Ok(None);
        }
        for answer in tables.answers.values_mut() {
            if answer.question_id == *question_id {
                answer.accepted = answer.id == *id;
            }
        }
        Ok(tables.answers.get(id).cloned())
    }

    async fn find_unlinked(&self, limit: u32) -> Result<Vec<Answer>, AnswerRepositoryError> {
        let tables = self.store.lock().map_err(AnswerRepositoryError::query)?;
        let mut unlinked: Vec<Answer> = tables
            .answers
            .values()
            .filter(|answer| {
                tables
                    .questions
                    .get(&answer.question_id)
                    .is_some_and(|question| !question.links_answer(&answer.id))
            })
            .cloned()
            .collect();
        drop(tables);
        unlinked.sort_by(oldest_first);
        unlinked.truncate(limit as usize);
        Ok(unlinked)
    }
}
