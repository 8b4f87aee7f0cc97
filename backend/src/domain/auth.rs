//! Authentication primitives: registration input, login credentials, password
//! material and bearer-token claims.
//!
//! Inbound adapters parse raw payload strings through the constructors here so
//! identity services only ever see validated values.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use zeroize::Zeroizing;

use crate::domain::{DisplayName, EmailAddress, Role, User, UserId, UserValidationError};

/// Minimum password length accepted at registration.
pub const PASSWORD_MIN_LENGTH: usize = 6;

/// Reasons a registration payload is refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationValidationError {
    /// Name, email or password was missing or blank.
    MissingFields,
    /// Email did not look like `local@domain.tld`.
    InvalidEmail,
    /// Name exceeded the display-name limit.
    NameTooLong { max: usize },
    /// Password was shorter than [`PASSWORD_MIN_LENGTH`].
    PasswordTooShort { min: usize },
    /// Role was outside Guest, User and Admin.
    InvalidRole { value: String },
}

impl fmt::Display for RegistrationValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingFields => write!(f, "Name, email, and password are required"),
            Self::InvalidEmail => write!(f, "Please provide a valid email address"),
            Self::NameTooLong { max } => write!(f, "Name must be at most {max} characters long"),
            Self::PasswordTooShort { min } => {
                write!(f, "Password must be at least {min} characters long")
            }
            Self::InvalidRole { .. } => write!(f, "Invalid role specified"),
        }
    }
}

impl std::error::Error for RegistrationValidationError {}

/// Plaintext password held only long enough to hash or verify.
///
/// The buffer is zeroed on drop and never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct PlainPassword(Zeroizing<String>);

impl PlainPassword {
    /// Wrap caller-supplied password text verbatim.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(Zeroizing::new(raw.into()))
    }

    /// Borrow the password text for hashing.
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for PlainPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PlainPassword(..)")
    }
}

/// One-way password hash in PHC string form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Wrap an encoded hash produced by a credential hasher or read from storage.
    pub fn new(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    /// Encoded hash string.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Validated registration request.
///
/// # Examples
/// ```
/// use forum_backend::domain::{Registration, Role};
///
/// let registration = Registration::try_from_parts("Alice", "A@X.com", "secret1", None)
///     .expect("valid registration");
/// assert_eq!(registration.email().as_ref(), "a@x.com");
/// assert_eq!(registration.role(), Role::User);
/// ```
#[derive(Debug, Clone)]
pub struct Registration {
    name: DisplayName,
    email: EmailAddress,
    password: PlainPassword,
    role: Role,
}

impl Registration {
    /// Validate raw registration fields.
    ///
    /// Checks run in a fixed order (presence, email shape, password length,
    /// role) so the first failure reported is stable. A missing or blank role
    /// defaults to [`Role::User`].
    pub fn try_from_parts(
        name: &str,
        email: &str,
        password: &str,
        role: Option<&str>,
    ) -> Result<Self, RegistrationValidationError> {
        if name.trim().is_empty() || email.trim().is_empty() || password.is_empty() {
            return Err(RegistrationValidationError::MissingFields);
        }

        let email =
            EmailAddress::new(email).map_err(|_| RegistrationValidationError::InvalidEmail)?;

        if password.chars().count() < PASSWORD_MIN_LENGTH {
            return Err(RegistrationValidationError::PasswordTooShort {
                min: PASSWORD_MIN_LENGTH,
            });
        }

        let role = match role.map(str::trim).filter(|raw| !raw.is_empty()) {
            Some(raw) => raw
                .parse::<Role>()
                .map_err(|_| RegistrationValidationError::InvalidRole {
                    value: raw.to_owned(),
                })?,
            None => Role::default(),
        };

        let name = DisplayName::new(name).map_err(|err| match err {
            UserValidationError::NameTooLong { max } => {
                RegistrationValidationError::NameTooLong { max }
            }
            _ => RegistrationValidationError::MissingFields,
        })?;

        Ok(Self {
            name,
            email,
            password: PlainPassword::new(password),
            role,
        })
    }

    /// Display name for the new account.
    pub fn name(&self) -> &DisplayName {
        &self.name
    }

    /// Canonical email for the new account.
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Password to hash before storage.
    pub fn password(&self) -> &PlainPassword {
        &self.password
    }

    /// Requested role.
    pub fn role(&self) -> Role {
        self.role
    }
}

/// Domain error returned when login payload values are missing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginValidationError {
    /// Email or password was missing or blank.
    MissingFields,
}

impl fmt::Display for LoginValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingFields => write!(f, "All fields are required"),
        }
    }
}

impl std::error::Error for LoginValidationError {}

/// Validated login credentials.
///
/// ## Invariants
/// - `email` is the canonical lookup form (trimmed, lowercase) and non-empty.
///   Its format is not checked; an unknown address simply finds no user.
/// - `password` is non-empty and keeps caller-provided whitespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: String,
    password: PlainPassword,
}

impl LoginCredentials {
    /// Construct credentials from raw email/password inputs.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, LoginValidationError> {
        let email = EmailAddress::canonicalise(email);
        if email.is_empty() || password.is_empty() {
            return Err(LoginValidationError::MissingFields);
        }
        Ok(Self {
            email,
            password: PlainPassword::new(password),
        })
    }

    /// Canonical email used for the user lookup.
    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    /// Password provided by the caller.
    pub fn password(&self) -> &PlainPassword {
        &self.password
    }
}

/// Claims carried by a signed access token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenClaims {
    pub user_id: UserId,
    pub email: String,
    pub role: Role,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl TokenClaims {
    /// Claims for `user` valid from `issued_at` for `ttl`.
    pub fn for_user(user: &User, issued_at: DateTime<Utc>, ttl: chrono::Duration) -> Self {
        Self {
            user_id: user.id().clone(),
            email: user.email().to_string(),
            role: user.role(),
            issued_at,
            expires_at: issued_at + ttl,
        }
    }

    /// Whether the token has lapsed at `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Encoded bearer token handed to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(transparent)]
pub struct AccessToken(String);

impl AccessToken {
    /// Wrap an encoded token string.
    pub fn new(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    /// Encoded token text.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Result of a successful registration or login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct AuthSession {
    pub user: User,
    pub token: AccessToken,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", "a@x.com", "secret1", None, RegistrationValidationError::MissingFields)]
    #[case("Alice", " ", "secret1", None, RegistrationValidationError::MissingFields)]
    #[case("Alice", "a@x.com", "", None, RegistrationValidationError::MissingFields)]
    #[case("Alice", "a@x", "secret1", None, RegistrationValidationError::InvalidEmail)]
    #[case(
        "Alice",
        "a@x.com",
        "five5",
        None,
        RegistrationValidationError::PasswordTooShort { min: PASSWORD_MIN_LENGTH }
    )]
    #[case(
        "Alice",
        "a@x.com",
        "secret1",
        Some("Root"),
        RegistrationValidationError::InvalidRole { value: "Root".to_owned() }
    )]
    fn registration_rejects_in_order(
        #[case] name: &str,
        #[case] email: &str,
        #[case] password: &str,
        #[case] role: Option<&str>,
        #[case] expected: RegistrationValidationError,
    ) {
        let err = Registration::try_from_parts(name, email, password, role)
            .expect_err("invalid registration");
        assert_eq!(err, expected);
    }

    #[rstest]
    fn email_check_precedes_password_check() {
        let err = Registration::try_from_parts("Alice", "bad", "x", None).expect_err("invalid");
        assert_eq!(err, RegistrationValidationError::InvalidEmail);
    }

    #[rstest]
    #[case(None, Role::User)]
    #[case(Some(""), Role::User)]
    #[case(Some("Guest"), Role::Guest)]
    #[case(Some("Admin"), Role::Admin)]
    fn registration_resolves_role(#[case] role: Option<&str>, #[case] expected: Role) {
        let registration = Registration::try_from_parts("Alice", "a@x.com", "secret1", role)
            .expect("valid registration");
        assert_eq!(registration.role(), expected);
    }

    #[rstest]
    fn registration_messages_match_public_contract() {
        assert_eq!(
            RegistrationValidationError::PasswordTooShort { min: 6 }.to_string(),
            "Password must be at least 6 characters long"
        );
        assert_eq!(
            RegistrationValidationError::MissingFields.to_string(),
            "Name, email, and password are required"
        );
    }

    #[rstest]
    #[case("", "pw")]
    #[case("   ", "pw")]
    #[case("a@x.com", "")]
    fn login_requires_both_fields(#[case] email: &str, #[case] password: &str) {
        assert_eq!(
            LoginCredentials::try_from_parts(email, password),
            Err(LoginValidationError::MissingFields)
        );
    }

    #[rstest]
    fn login_canonicalises_email_but_keeps_password() {
        let creds = LoginCredentials::try_from_parts(" A@X.com ", " pass ").expect("valid");
        assert_eq!(creds.email(), "a@x.com");
        assert_eq!(creds.password().expose(), " pass ");
    }

    #[rstest]
    fn plain_password_debug_is_redacted() {
        let rendered = format!("{:?}", PlainPassword::new("hunter22"));
        assert!(!rendered.contains("hunter22"));
    }

    #[rstest]
    fn claims_expire_at_boundary() {
        let now = Utc::now();
        let user = User::new(
            UserId::random(),
            DisplayName::new("Alice").expect("valid"),
            EmailAddress::new("a@x.com").expect("valid"),
            Role::User,
            now,
        );
        let claims = TokenClaims::for_user(&user, now, chrono::Duration::hours(1));
        assert!(!claims.is_expired(now + chrono::Duration::minutes(59)));
        assert!(claims.is_expired(now + chrono::Duration::hours(1)));
    }
}
