//! In-memory `QuestionRepository`.

use std::cmp::Ordering;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pagination::Page;

use crate::domain::ports::{QuestionRepository, QuestionRepositoryError};
use crate::domain::{AnswerId, Question, QuestionId, QuestionListQuery, QuestionSort};

use super::{MemoryStore, paginate};

fn newest_first(a: &Question, b: &Question) -> Ordering {
    b.created_at
        .cmp(&a.created_at)
        .then_with(|| b.id.cmp(&a.id))
}

fn compare_questions(sort: QuestionSort, a: &Question, b: &Question) -> Ordering {
    match sort {
        QuestionSort::Newest | QuestionSort::Unanswered => newest_first(a, b),
        QuestionSort::Oldest => a
            .created_at
            .cmp(&b.created_at)
            .then_with(|| a.id.cmp(&b.id)),
        QuestionSort::MostVoted => b.votes.cmp(&a.votes).then_with(|| newest_first(a, b)),
    }
}

/// Questions held in a [`MemoryStore`].
#[derive(Clone)]
pub struct MemoryQuestionRepository {
    store: MemoryStore,
}

impl MemoryQuestionRepository {
    /// View over `store`.
    pub fn new(store: MemoryStore) -> Self {
        Self { store }
    }

    fn update<F>(&self, id: &QuestionId, apply: F) -> Result<Option<Question>, QuestionRepositoryError>
    where
        F: FnOnce(&mut Question),
    {
        let mut tables = self.store.lock().map_err(QuestionRepositoryError::query)?;
        Ok(tables.questions.get_mut(id).map(|question| {
            apply(question);
            question.clone()
        }))
    }
}

#[async_trait]
impl QuestionRepository for MemoryQuestionRepository {
    async fn insert(&self, question: &Question) -> Result<(), QuestionRepositoryError> {
        let mut tables = self.store.lock().map_err(QuestionRepositoryError::query)?;
        tables.questions.insert(question.id, question.clone());
        Ok(())
    }

    async fn find_by_id(
        &self,
        id: &QuestionId,
    ) -> Result<Option<Question>, QuestionRepositoryError> {
        let tables = self.store.lock().map_err(QuestionRepositoryError::query)?;
        Ok(tables.questions.get(id).cloned())
    }

    async fn find_by_ids(
        &self,
        ids: &[QuestionId],
    ) -> Result<Vec<Question>, QuestionRepositoryError> {
        let tables = self.store.lock().map_err(QuestionRepositoryError::query)?;
        Ok(ids
            .iter()
            .filter_map(|id| tables.questions.get(id).cloned())
            .collect())
    }

    async fn list(
        &self,
        query: &QuestionListQuery,
    ) -> Result<Page<Question>, QuestionRepositoryError> {
        let tables = self.store.lock().map_err(QuestionRepositoryError::query)?;
        let mut matches: Vec<Question> = tables
            .questions
            .values()
            .filter(|question| query.admits(question))
            .cloned()
            .collect();
        drop(tables);
        matches.sort_by(|a, b| compare_questions(query.sort, a, b));
        Ok(paginate(matches, query.page))
    }

    async fn record_view(
        &self,
        id: &QuestionId,
    ) -> Result<Option<Question>, QuestionRepositoryError> {
        let mut tables = self.store.lock().map_err(QuestionRepositoryError::query)?;
        Ok(tables.questions.get_mut(id).map(|question| {
            let seen = question.clone();
            question.views += 1;
            seen
        }))
    }

    async fn append_answer(
        &self,
        id: &QuestionId,
        answer_id: &AnswerId,
        at: DateTime<Utc>,
    ) -> Result<bool, QuestionRepositoryError> {
        let updated = self.update(id, |question| {
            if !question.links_answer(answer_id) {
                question.answer_ids.push(*answer_id);
            }
            question.updated_at = at;
        })?;
        Ok(updated.is_some())
    }

    async fn close(
        &self,
        id: &QuestionId,
        at: DateTime<Utc>,
    ) -> Result<Option<Question>, QuestionRepositoryError> {
        self.update(id, |question| {
            question.is_closed = true;
            question.updated_at = at;
        })
    }

    async fn set_accepted_answer(
        &self,
        id: &QuestionId,
        answer_id: &AnswerId,
        at: DateTime<Utc>,
    ) -> Result<Option<Question>, QuestionRepositoryError> {
        self.update(id, |question| {
            question.accepted_answer = Some(*answer_id);
            question.updated_at = at;
        })
    }
}
