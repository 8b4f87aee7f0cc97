//! Tests for the notification service.

use std::sync::Arc;

use pagination::{Page, PageRequest};
use rstest::{fixture, rstest};

use super::*;
use crate::domain::ports::{
    MockAnswerRepository, MockNotificationRepository, MockQuestionRepository,
};
use crate::domain::service_test_support::{
    alice, bob, fixture_clock, fixture_now, make_answer, make_question,
};
use crate::domain::{ErrorCode, NotificationKind, NotificationMessage};

struct Mocks {
    notifications: MockNotificationRepository,
    questions: MockQuestionRepository,
    answers: MockAnswerRepository,
}

impl Mocks {
    fn into_service(
        self,
    ) -> NotificationServiceImpl<MockNotificationRepository, MockQuestionRepository, MockAnswerRepository>
    {
        NotificationServiceImpl::new(
            Arc::new(self.notifications),
            Arc::new(self.questions),
            Arc::new(self.answers),
            fixture_clock(),
        )
    }
}

#[fixture]
fn mocks() -> Mocks {
    Mocks {
        notifications: MockNotificationRepository::new(),
        questions: MockQuestionRepository::new(),
        answers: MockAnswerRepository::new(),
    }
}

fn draft_for(user: &User) -> NotificationDraft {
    NotificationDraft {
        recipient: user.id().clone(),
        kind: NotificationKind::Mention,
        message: NotificationMessage::new("You were mentioned").expect("valid message"),
        related_question: None,
        related_answer: None,
    }
}

#[rstest]
#[tokio::test]
async fn list_populates_related_records_and_unread_total(mut mocks: Mocks) {
    let owner = alice();
    let question = make_question(&owner);
    let answer = make_answer(&question, &bob());
    let mut draft = draft_for(&owner);
    draft.related_question = Some(question.id);
    draft.related_answer = Some(answer.id);
    let linked = Notification::from_draft(NotificationId::random(), draft, fixture_now());
    let plain = Notification::from_draft(NotificationId::random(), draft_for(&owner), fixture_now());
    let query = NotificationListQuery {
        user_id: owner.id().clone(),
        unread_only: false,
        page: PageRequest::new(1, 20).expect("valid page"),
    };
    mocks
        .notifications
        .expect_list_for_user()
        .return_once(move |query| Ok(Page::new(vec![linked, plain], query.page, 2)));
    mocks
        .notifications
        .expect_count_unread()
        .return_once(|_| Ok(7));
    let title = question.title.as_ref().to_owned();
    mocks
        .questions
        .expect_find_by_ids()
        .withf(|ids| ids.len() == 1)
        .times(1)
        .return_once(move |_| Ok(vec![question]));
    mocks
        .answers
        .expect_find_by_ids()
        .times(1)
        .return_once(move |_| Ok(vec![answer]));

    let listing = mocks
        .into_service()
        .list(query)
        .await
        .expect("listing succeeds");

    assert_eq!(listing.unread_count, 7);
    assert_eq!(listing.page.info.total(), 2);
    let first = &listing.page.items[0];
    assert_eq!(
        first.related_question.as_ref().map(|q| q.title.as_str()),
        Some(title.as_str())
    );
    assert_eq!(
        first.related_answer.as_ref().map(|a| a.content.as_str()),
        Some("Use flexbox!")
    );
    assert!(listing.page.items[1].related_question.is_none());
}

#[rstest]
#[tokio::test]
async fn create_stores_unread_notification(mut mocks: Mocks) {
    let owner = alice();
    mocks
        .notifications
        .expect_insert()
        .withf(|notification| !notification.read && notification.created_at == fixture_now())
        .times(1)
        .return_once(|_| Ok(()));
    mocks.questions.expect_find_by_ids().times(0);

    let details = mocks
        .into_service()
        .create(draft_for(&owner))
        .await
        .expect("created");

    assert_eq!(&details.notification.user_id, owner.id());
    assert_eq!(details.notification.kind, NotificationKind::Mention);
}

#[rstest]
#[case(NotificationAction::MarkRead)]
#[case(NotificationAction::MarkUnread)]
#[case(NotificationAction::Delete)]
#[tokio::test]
async fn targeted_actions_require_an_id(mocks: Mocks, #[case] action: NotificationAction) {
    let error = mocks
        .into_service()
        .update(&alice(), None, action)
        .await
        .expect_err("missing id");

    assert_eq!(error.code(), ErrorCode::InvalidRequest);
    assert_eq!(error.message(), "Notification ID is required");
}

#[rstest]
#[case(true)]
#[case(false)]
#[tokio::test]
async fn mark_read_flags_are_scoped_to_owner(mut mocks: Mocks, #[case] read: bool) {
    let owner = alice();
    let owner_id = owner.id().clone();
    let mut stored = Notification::from_draft(NotificationId::random(), draft_for(&owner), fixture_now());
    stored.read = read;
    let id = stored.id;
    mocks
        .notifications
        .expect_set_read()
        .withf(move |target, scoped_owner, flag| {
            *target == id && *scoped_owner == owner_id && *flag == read
        })
        .return_once(move |_, _, _| Ok(Some(stored)));
    let action = if read {
        NotificationAction::MarkRead
    } else {
        NotificationAction::MarkUnread
    };

    let outcome = mocks
        .into_service()
        .update(&owner, Some(id), action)
        .await
        .expect("update succeeds");

    match outcome {
        NotificationUpdateOutcome::Updated(details) => assert_eq!(details.notification.read, read),
        other => panic!("unexpected outcome {other:?}"),
    }
}

#[rstest]
#[tokio::test]
async fn foreign_notification_is_not_found(mut mocks: Mocks) {
    mocks
        .notifications
        .expect_set_read()
        .return_once(|_, _, _| Ok(None));

    let error = mocks
        .into_service()
        .update(&bob(), Some(NotificationId::random()), NotificationAction::MarkRead)
        .await
        .expect_err("not the owner");

    assert_eq!(error.code(), ErrorCode::NotFound);
    assert_eq!(error.message(), "Notification not found");
}

#[rstest]
#[case(true, true)]
#[case(false, false)]
#[tokio::test]
async fn delete_reports_missing_target(
    mut mocks: Mocks,
    #[case] removed: bool,
    #[case] succeeds: bool,
) {
    mocks
        .notifications
        .expect_delete()
        .return_once(move |_, _| Ok(removed));

    let result = mocks
        .into_service()
        .update(&alice(), Some(NotificationId::random()), NotificationAction::Delete)
        .await;

    if succeeds {
        assert_eq!(result.expect("deleted"), NotificationUpdateOutcome::Deleted);
    } else {
        assert_eq!(result.expect_err("missing").code(), ErrorCode::NotFound);
    }
}

#[rstest]
#[tokio::test]
async fn mark_all_read_ignores_supplied_id(mut mocks: Mocks) {
    mocks
        .notifications
        .expect_mark_all_read()
        .times(1)
        .return_once(|_| Ok(3));
    mocks.notifications.expect_set_read().times(0);

    let outcome = mocks
        .into_service()
        .update(&alice(), Some(NotificationId::random()), NotificationAction::MarkAllRead)
        .await
        .expect("bulk update");

    assert_eq!(
        outcome,
        NotificationUpdateOutcome::AllMarkedRead { updated_count: 3 }
    );
}

#[rstest]
#[case(NotificationScope::All, 5)]
#[case(NotificationScope::Read, 2)]
#[tokio::test]
async fn delete_bulk_passes_scope_through(
    mut mocks: Mocks,
    #[case] scope: NotificationScope,
    #[case] removed: u64,
) {
    mocks
        .notifications
        .expect_delete_matching()
        .withf(move |_, requested| *requested == scope)
        .return_once(move |_, _| Ok(removed));

    let deleted = mocks
        .into_service()
        .delete_bulk(&alice(), scope)
        .await
        .expect("bulk delete");

    assert_eq!(deleted, removed);
}
