//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on driving ports and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    AnswerService, IdentityService, NotificationService, QuestionService, VoteService,
};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub identity: Arc<dyn IdentityService>,
    pub questions: Arc<dyn QuestionService>,
    pub answers: Arc<dyn AnswerService>,
    pub votes: Arc<dyn VoteService>,
    pub notifications: Arc<dyn NotificationService>,
}

impl HttpState {
    /// Bundle the driving ports used by the handlers.
    pub fn new(
        identity: Arc<dyn IdentityService>,
        questions: Arc<dyn QuestionService>,
        answers: Arc<dyn AnswerService>,
        votes: Arc<dyn VoteService>,
        notifications: Arc<dyn NotificationService>,
    ) -> Self {
        Self {
            identity,
            questions,
            answers,
            votes,
            notifications,
        }
    }
}
