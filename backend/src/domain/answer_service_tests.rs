//! Tests for the answer service.

use std::sync::Arc;

use pagination::{Page, PageRequest};
use rstest::{fixture, rstest};

use super::*;
use crate::domain::ports::{
    MockAnswerRepository, MockNotificationDispatcher, MockQuestionRepository, MockUserRepository,
    QuestionRepositoryError,
};
use crate::domain::service_test_support::{alice, bob, fixture_clock, make_answer, make_question};
use crate::domain::{AnswerSort, ErrorCode};

struct Mocks {
    answers: MockAnswerRepository,
    questions: MockQuestionRepository,
    users: MockUserRepository,
    notifications: MockNotificationDispatcher,
}

type Service = AnswerServiceImpl<
    MockAnswerRepository,
    MockQuestionRepository,
    MockUserRepository,
    MockNotificationDispatcher,
>;

impl Mocks {
    fn into_service(self) -> Service {
        AnswerServiceImpl::new(
            Arc::new(self.answers),
            Arc::new(self.questions),
            Arc::new(self.users),
            Arc::new(self.notifications),
            fixture_clock(),
        )
    }
}

#[fixture]
fn mocks() -> Mocks {
    Mocks {
        answers: MockAnswerRepository::new(),
        questions: MockQuestionRepository::new(),
        users: MockUserRepository::new(),
        notifications: MockNotificationDispatcher::new(),
    }
}

fn content() -> AnswerContent {
    AnswerContent::new("Use display: flex on the parent.").expect("valid content")
}

#[rstest]
#[tokio::test]
async fn create_inserts_then_links(mut mocks: Mocks) {
    let question = make_question(&alice());
    let question_id = question.id;
    mocks
        .questions
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(question)));
    mocks.answers.expect_insert().times(1).return_once(|_| Ok(()));
    mocks
        .questions
        .expect_append_answer()
        .withf(move |id, _, _| *id == question_id)
        .times(1)
        .return_once(|_, _, _| Ok(true));

    let details = mocks
        .into_service()
        .create(&bob(), question_id, content())
        .await
        .expect("answer created");

    assert_eq!(details.answer.question_id, question_id);
    assert_eq!(details.answer.votes, 0);
    assert_eq!(
        details.owner.map(|owner| owner.name.to_string()),
        Some("Bob".to_owned())
    );
}

#[rstest]
#[tokio::test]
async fn create_rejects_closed_question(mut mocks: Mocks) {
    let mut question = make_question(&alice());
    question.is_closed = true;
    let question_id = question.id;
    mocks
        .questions
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(question)));
    mocks.answers.expect_insert().times(0);

    let error = mocks
        .into_service()
        .create(&bob(), question_id, content())
        .await
        .expect_err("closed question");

    assert_eq!(error.code(), ErrorCode::Rejected);
    assert_eq!(error.message(), "Cannot answer a closed question");
}

#[rstest]
#[tokio::test]
async fn create_reports_missing_question(mut mocks: Mocks) {
    mocks.questions.expect_find_by_id().return_once(|_| Ok(None));
    mocks.answers.expect_insert().times(0);

    let error = mocks
        .into_service()
        .create(&bob(), QuestionId::random(), content())
        .await
        .expect_err("missing question");

    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn create_retries_transient_link_failures(mut mocks: Mocks) {
    let question = make_question(&alice());
    let question_id = question.id;
    mocks
        .questions
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(question)));
    mocks.answers.expect_insert().return_once(|_| Ok(()));
    let mut calls = 0;
    mocks
        .questions
        .expect_append_answer()
        .times(LINK_ATTEMPTS)
        .returning(move |_, _, _| {
            calls += 1;
            if calls < LINK_ATTEMPTS {
                Err(QuestionRepositoryError::query("deadlock detected"))
            } else {
                Ok(true)
            }
        });

    mocks
        .into_service()
        .create(&bob(), question_id, content())
        .await
        .expect("third attempt links the answer");
}

#[rstest]
#[tokio::test]
async fn create_fails_after_exhausting_link_attempts(mut mocks: Mocks) {
    let question = make_question(&alice());
    let question_id = question.id;
    mocks
        .questions
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(question)));
    mocks.answers.expect_insert().return_once(|_| Ok(()));
    mocks
        .questions
        .expect_append_answer()
        .times(LINK_ATTEMPTS)
        .returning(|_, _, _| Err(QuestionRepositoryError::query("disk full")));

    let error = mocks
        .into_service()
        .create(&bob(), question_id, content())
        .await
        .expect_err("link never succeeds");

    assert_eq!(error.code(), ErrorCode::InternalError);
}

#[rstest]
#[tokio::test]
async fn list_requires_existing_question(mut mocks: Mocks) {
    mocks.questions.expect_find_by_id().return_once(|_| Ok(None));
    mocks.answers.expect_list_for_question().times(0);

    let error = mocks
        .into_service()
        .list(AnswerListQuery {
            question_id: QuestionId::random(),
            sort: AnswerSort::Newest,
            page: PageRequest::default(),
        })
        .await
        .expect_err("missing question");

    assert_eq!(error.message(), QUESTION_NOT_FOUND);
}

#[rstest]
#[tokio::test]
async fn list_populates_owners(mut mocks: Mocks) {
    let author = alice();
    let answerer = bob();
    let question = make_question(&author);
    let answer = make_answer(&question, &answerer);
    let question_id = question.id;
    mocks
        .questions
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(question)));
    mocks
        .answers
        .expect_list_for_question()
        .withf(|query| query.sort == AnswerSort::Accepted)
        .return_once(move |query| Ok(Page::new(vec![answer], query.page, 1)));
    mocks
        .users
        .expect_find_by_ids()
        .return_once(move |_| Ok(vec![answerer]));

    let page = mocks
        .into_service()
        .list(AnswerListQuery {
            question_id,
            sort: AnswerSort::Accepted,
            page: PageRequest::default(),
        })
        .await
        .expect("listing succeeds");

    assert_eq!(page.items.len(), 1);
    assert_eq!(
        page.items[0].owner.as_ref().map(|owner| owner.email.as_ref()),
        Some("b@x.com")
    );
}

#[rstest]
#[tokio::test]
async fn accept_marks_answer_and_notifies_owner(mut mocks: Mocks) {
    let author = alice();
    let answerer = bob();
    let question = make_question(&author);
    let answer = make_answer(&question, &answerer);
    let answer_id = answer.id;
    let question_id = question.id;
    let recipient = answerer.id().clone();
    let mut accepted = answer.clone();
    accepted.accepted = true;
    mocks
        .answers
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(answer)));
    mocks
        .questions
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(question.clone())));
    mocks
        .answers
        .expect_mark_accepted()
        .withf(move |qid, aid| *qid == question_id && *aid == answer_id)
        .return_once(move |_, _| Ok(Some(accepted)));
    let linked = make_question(&author);
    mocks
        .questions
        .expect_set_accepted_answer()
        .return_once(move |_, _, _| Ok(Some(linked)));
    mocks
        .notifications
        .expect_dispatch()
        .withf(move |draft| {
            draft.recipient == recipient
                && draft.kind == NotificationKind::Answer
                && draft.message.as_ref() == "Alice accepted your answer"
                && draft.related_answer == Some(answer_id)
        })
        .times(1)
        .return_const(());
    mocks
        .users
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(answerer)));

    let details = mocks
        .into_service()
        .accept(&author, answer_id)
        .await
        .expect("acceptance succeeds");

    assert!(details.answer.accepted);
}

#[rstest]
#[tokio::test]
async fn accept_is_limited_to_question_author(mut mocks: Mocks) {
    let question = make_question(&alice());
    let answer = make_answer(&question, &bob());
    let answer_id = answer.id;
    mocks
        .answers
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(answer)));
    mocks
        .questions
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(question)));
    mocks.answers.expect_mark_accepted().times(0);
    mocks.notifications.expect_dispatch().times(0);

    let error = mocks
        .into_service()
        .accept(&bob(), answer_id)
        .await
        .expect_err("answerer is not the author");

    assert_eq!(error.code(), ErrorCode::Forbidden);
}

#[rstest]
#[tokio::test]
async fn reconcile_relinks_orphans_and_counts_failures(mut mocks: Mocks) {
    let question = make_question(&alice());
    let healthy = make_answer(&question, &bob());
    let broken = make_answer(&question, &bob());
    let broken_id = broken.id;
    let batch = vec![healthy, broken.clone()];
    let mut served = false;
    mocks
        .answers
        .expect_find_unlinked()
        .returning(move |_| {
            if served {
                Ok(vec![broken.clone()])
            } else {
                served = true;
                Ok(batch.clone())
            }
        });
    mocks
        .questions
        .expect_append_answer()
        .returning(move |_, answer_id, _| {
            if *answer_id == broken_id {
                Err(QuestionRepositoryError::query("constraint violated"))
            } else {
                Ok(true)
            }
        });

    let report = mocks
        .into_service()
        .reconcile_links()
        .await
        .expect("reconciliation completes");

    assert_eq!(
        report,
        ReconciliationReport {
            unlinked: 2,
            relinked: 1,
            failed: 1,
        }
    );
}
