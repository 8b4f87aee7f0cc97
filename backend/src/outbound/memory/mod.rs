//! In-process adapters for every repository port.
//!
//! All four repositories share one mutex-guarded table set, so cross-table
//! reads (answer back-references, notification population) see a consistent
//! snapshot. Counter updates happen under the lock and are therefore atomic,
//! matching the single-statement updates of the PostgreSQL adapters.
//!
//! Used when no database URL is configured and throughout the tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use pagination::{Page, PageRequest};

use crate::domain::{
    Answer, AnswerId, Notification, NotificationId, PasswordHash, Question, QuestionId, User,
    UserId,
};

mod answers;
mod notifications;
mod questions;
mod users;

pub use answers::MemoryAnswerRepository;
pub use notifications::MemoryNotificationRepository;
pub use questions::MemoryQuestionRepository;
pub use users::MemoryUserRepository;

#[derive(Default)]
pub(crate) struct Tables {
    pub(crate) users: HashMap<UserId, (User, PasswordHash)>,
    pub(crate) questions: HashMap<QuestionId, Question>,
    pub(crate) answers: HashMap<AnswerId, Answer>,
    pub(crate) notifications: HashMap<NotificationId, Notification>,
}

/// Shared table set backing the in-memory repositories.
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Repository views over this store.
    pub fn repositories(
        &self,
    ) -> (
        MemoryUserRepository,
        MemoryQuestionRepository,
        MemoryAnswerRepository,
        MemoryNotificationRepository,
    ) {
        (
            MemoryUserRepository::new(self.clone()),
            MemoryQuestionRepository::new(self.clone()),
            MemoryAnswerRepository::new(self.clone()),
            MemoryNotificationRepository::new(self.clone()),
        )
    }

    pub(crate) fn lock(&self) -> Result<MutexGuard<'_, Tables>, String> {
        self.tables
            .lock()
            .map_err(|_| "in-memory store lock poisoned".to_owned())
    }
}

/// Slice an already ordered result set into the requested page.
pub(crate) fn paginate<T>(items: Vec<T>, request: PageRequest) -> Page<T> {
    let total = items.len() as u64;
    let offset = usize::try_from(request.offset()).unwrap_or(usize::MAX);
    let page_items = items
        .into_iter()
        .skip(offset)
        .take(request.limit() as usize)
        .collect();
    Page::new(page_items, request, total)
}
