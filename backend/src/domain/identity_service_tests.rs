//! Tests for the identity service.

use std::sync::Arc;

use rstest::{fixture, rstest};

use super::*;
use crate::domain::ports::{MockAccessTokenCodec, MockCredentialHasher, MockUserRepository};
use crate::domain::service_test_support::{alice, fixture_clock, fixture_now};
use crate::domain::{ErrorCode, PasswordHash, Role};

type Service = IdentityServiceImpl<MockUserRepository, MockCredentialHasher, MockAccessTokenCodec>;

struct Mocks {
    users: MockUserRepository,
    hasher: MockCredentialHasher,
    tokens: MockAccessTokenCodec,
}

impl Mocks {
    fn into_service(self) -> Service {
        IdentityServiceImpl::new(
            Arc::new(self.users),
            Arc::new(self.hasher),
            Arc::new(self.tokens),
            fixture_clock(),
        )
    }
}

#[fixture]
fn mocks() -> Mocks {
    Mocks {
        users: MockUserRepository::new(),
        hasher: MockCredentialHasher::new(),
        tokens: MockAccessTokenCodec::new(),
    }
}

fn registration() -> Registration {
    Registration::try_from_parts("Alice", "A@x.com", "secret1", None).expect("valid registration")
}

fn stored_hash() -> PasswordHash {
    PasswordHash::new("$argon2id$v=19$m=8,t=1,p=1$c2FsdHNhbHQ$aGFzaA")
}

#[rstest]
#[tokio::test]
async fn register_stores_hash_and_issues_hour_long_token(mut mocks: Mocks) {
    mocks
        .users
        .expect_find_credentials_by_email()
        .withf(|email| email == "a@x.com")
        .times(1)
        .return_once(|_| Ok(None));
    mocks
        .hasher
        .expect_hash()
        .withf(|password| password.expose() == "secret1")
        .times(1)
        .return_once(|_| Ok(stored_hash()));
    mocks
        .users
        .expect_insert()
        .withf(|user, hash| {
            user.email().as_ref() == "a@x.com"
                && user.role() == Role::User
                && hash.as_str() != "secret1"
        })
        .times(1)
        .return_once(|_, _| Ok(()));
    mocks
        .tokens
        .expect_issue()
        .withf(|claims| {
            claims.email == "a@x.com"
                && claims.issued_at == fixture_now()
                && claims.expires_at - claims.issued_at == TimeDelta::hours(1)
        })
        .times(1)
        .return_once(|_| Ok(AccessToken::new("signed.token.value")));

    let session = mocks
        .into_service()
        .register(registration())
        .await
        .expect("registration succeeds");

    assert_eq!(session.user.name().as_ref(), "Alice");
    assert_eq!(session.token.as_str(), "signed.token.value");
}

#[rstest]
#[tokio::test]
async fn register_rejects_existing_email_without_hashing(mut mocks: Mocks) {
    mocks
        .users
        .expect_find_credentials_by_email()
        .return_once(|_| {
            Ok(Some(UserCredentials {
                user: alice(),
                password_hash: stored_hash(),
            }))
        });
    mocks.hasher.expect_hash().times(0);
    mocks.users.expect_insert().times(0);

    let error = mocks
        .into_service()
        .register(registration())
        .await
        .expect_err("duplicate email");

    assert_eq!(error.code(), ErrorCode::Conflict);
    assert_eq!(error.message(), "User with this email already exists");
}

#[rstest]
#[tokio::test]
async fn register_maps_insert_race_to_conflict(mut mocks: Mocks) {
    mocks
        .users
        .expect_find_credentials_by_email()
        .return_once(|_| Ok(None));
    mocks
        .hasher
        .expect_hash()
        .return_once(|_| Ok(stored_hash()));
    mocks
        .users
        .expect_insert()
        .return_once(|_, _| Err(UserRepositoryError::duplicate_email("a@x.com")));
    mocks.tokens.expect_issue().times(0);

    let error = mocks
        .into_service()
        .register(registration())
        .await
        .expect_err("duplicate email");

    assert_eq!(error.code(), ErrorCode::Conflict);
}

#[rstest]
#[tokio::test]
async fn register_maps_connection_loss_to_service_unavailable(mut mocks: Mocks) {
    mocks
        .users
        .expect_find_credentials_by_email()
        .return_once(|_| Err(UserRepositoryError::connection("pool exhausted")));

    let error = mocks
        .into_service()
        .register(registration())
        .await
        .expect_err("repository down");

    assert_eq!(error.code(), ErrorCode::ServiceUnavailable);
}

fn login(password: &str) -> LoginCredentials {
    LoginCredentials::try_from_parts("a@x.com", password).expect("valid credentials")
}

#[rstest]
#[tokio::test]
async fn login_reports_unknown_email_as_not_found(mut mocks: Mocks) {
    mocks
        .users
        .expect_find_credentials_by_email()
        .return_once(|_| Ok(None));
    mocks.hasher.expect_verify().times(0);

    let error = mocks
        .into_service()
        .login(login("secret1"))
        .await
        .expect_err("unknown user");

    assert_eq!(error.code(), ErrorCode::NotFound);
    assert_eq!(error.message(), "User not found");
}

#[rstest]
#[case(true, None)]
#[case(false, Some(ErrorCode::Unauthorized))]
#[tokio::test]
async fn login_checks_password_hash(
    mut mocks: Mocks,
    #[case] matches: bool,
    #[case] expected_error: Option<ErrorCode>,
) {
    mocks
        .users
        .expect_find_credentials_by_email()
        .return_once(|_| {
            Ok(Some(UserCredentials {
                user: alice(),
                password_hash: stored_hash(),
            }))
        });
    mocks
        .hasher
        .expect_verify()
        .times(1)
        .return_once(move |_, _| Ok(matches));
    mocks
        .tokens
        .expect_issue()
        .times(usize::from(matches))
        .returning(|_| Ok(AccessToken::new("t")));

    let result = mocks.into_service().login(login("secret1")).await;

    match expected_error {
        None => assert_eq!(result.expect("login succeeds").user.name().as_ref(), "Alice"),
        Some(code) => assert_eq!(result.expect_err("login fails").code(), code),
    }
}

#[rstest]
#[tokio::test]
async fn resolve_token_returns_none_for_rejected_tokens(mut mocks: Mocks) {
    mocks
        .tokens
        .expect_verify()
        .return_once(|_, _| Err(AccessTokenError::Expired));
    mocks.users.expect_find_by_id().times(0);

    let resolved = mocks
        .into_service()
        .resolve_token("expired")
        .await
        .expect("verification failures are not errors");

    assert!(resolved.is_none());
}

#[rstest]
#[tokio::test]
async fn resolve_token_loads_claimed_user(mut mocks: Mocks) {
    let user = alice();
    let claims = TokenClaims::for_user(&user, fixture_now(), TimeDelta::hours(1));
    let expected_id = user.id().clone();
    mocks
        .tokens
        .expect_verify()
        .withf(|token, now| token == "good" && *now == fixture_now())
        .return_once(move |_, _| Ok(claims));
    mocks
        .users
        .expect_find_by_id()
        .withf(move |id| id == &expected_id)
        .return_once(move |_| Ok(Some(user)));

    let resolved = mocks
        .into_service()
        .resolve_token("good")
        .await
        .expect("resolution succeeds")
        .expect("user exists");

    assert_eq!(resolved.email().as_ref(), "a@x.com");
}
