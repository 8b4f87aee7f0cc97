//! Shared fixtures for domain service tests.

use std::sync::Arc;

use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;

use crate::domain::{
    Answer, AnswerContent, AnswerId, DisplayName, EmailAddress, Question, QuestionDraft,
    QuestionId, Role, User, UserId,
};

pub(crate) struct FixtureClock {
    pub(crate) utc_now: DateTime<Utc>,
}

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.utc_now.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.utc_now
    }
}

pub(crate) fn fixture_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 14, 9, 30, 0)
        .single()
        .expect("valid fixture timestamp")
}

pub(crate) fn fixture_clock() -> Arc<dyn Clock> {
    Arc::new(FixtureClock {
        utc_now: fixture_now(),
    })
}

pub(crate) fn make_user(name: &str, email: &str, role: Role) -> User {
    User::new(
        UserId::random(),
        DisplayName::new(name).expect("fixture name"),
        EmailAddress::new(email).expect("fixture email"),
        role,
        fixture_now(),
    )
}

pub(crate) fn alice() -> User {
    make_user("Alice", "a@x.com", Role::User)
}

pub(crate) fn bob() -> User {
    make_user("Bob", "b@x.com", Role::User)
}

pub(crate) fn make_question(author: &User) -> Question {
    let draft = QuestionDraft::try_from_parts(
        "How do I center a div?",
        "Flexbox keeps confusing me.",
        &["css"],
    )
    .expect("fixture draft");
    Question::create(QuestionId::random(), draft, author.id().clone(), fixture_now())
}

pub(crate) fn make_answer(question: &Question, owner: &User) -> Answer {
    Answer::create(
        AnswerId::random(),
        AnswerContent::new("Use flexbox!").expect("fixture content"),
        question.id,
        owner.id().clone(),
        fixture_now(),
    )
}
