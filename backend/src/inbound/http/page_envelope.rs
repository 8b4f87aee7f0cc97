//! JSON pagination envelopes for list endpoints.
//!
//! Each listing names its total after the resource (`totalQuestions`,
//! `totalAnswers`, `totalNotifications`); the other fields are shared.

use pagination::PageInfo;
use serde::Serialize;
use utoipa::ToSchema;

macro_rules! page_envelope {
    ($(#[$meta:meta])* $name:ident, $total:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
        #[serde(rename_all = "camelCase")]
        pub struct $name {
            pub current_page: u32,
            pub total_pages: u64,
            pub $total: u64,
            pub has_next_page: bool,
            pub has_prev_page: bool,
        }

        impl From<PageInfo> for $name {
            fn from(info: PageInfo) -> Self {
                Self {
                    current_page: info.current_page(),
                    total_pages: info.total_pages(),
                    $total: info.total(),
                    has_next_page: info.has_next_page(),
                    has_prev_page: info.has_prev_page(),
                }
            }
        }
    };
}

page_envelope!(
    /// Pagination block of `GET /api/questions`.
    QuestionPagination,
    total_questions
);
page_envelope!(
    /// Pagination block of answer listings.
    AnswerPagination,
    total_answers
);
page_envelope!(
    /// Pagination block of `GET /api/notifications`.
    NotificationPagination,
    total_notifications
);
