//! Reference population shared by the question, answer and vote services.
//!
//! Listings resolve all referenced users with one batched lookup rather than
//! one query per row.

use std::collections::HashMap;

use crate::domain::ports::{UserRepository, UserRepositoryError};
use crate::domain::{Error, UserId, UserSummary};

pub(crate) fn map_user_repository_error(error: UserRepositoryError) -> Error {
    match error {
        UserRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserRepositoryError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
        UserRepositoryError::DuplicateEmail { email } => {
            Error::internal(format!("unexpected duplicate email during lookup: {email}"))
        }
    }
}

/// Summaries keyed by user id for every id in `ids` that still exists.
pub(crate) async fn user_summaries<U>(
    users: &U,
    ids: impl IntoIterator<Item = UserId>,
) -> Result<HashMap<UserId, UserSummary>, Error>
where
    U: UserRepository + ?Sized,
{
    let mut wanted: Vec<UserId> = Vec::new();
    for id in ids {
        if !wanted.contains(&id) {
            wanted.push(id);
        }
    }
    if wanted.is_empty() {
        return Ok(HashMap::new());
    }
    let found = users
        .find_by_ids(&wanted)
        .await
        .map_err(map_user_repository_error)?;
    Ok(found
        .into_iter()
        .map(|user| (user.id().clone(), user.summary()))
        .collect())
}

/// Summary of a single user, `None` when the account is gone.
pub(crate) async fn user_summary<U>(users: &U, id: &UserId) -> Result<Option<UserSummary>, Error>
where
    U: UserRepository + ?Sized,
{
    let user = users
        .find_by_id(id)
        .await
        .map_err(map_user_repository_error)?;
    Ok(user.map(|found| found.summary()))
}
