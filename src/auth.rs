//! Sign-in, registration and session bootstrap flows.
//!
//! These tie the endpoint client to the session store in the order pages
//! rely on: tokens first, then the profile, then navigation to the role's
//! home. Input is validated locally before any request goes out, so a typo
//! never costs a round trip.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use crate::guard::home_path;
use crate::net::client::ApiClient;
use crate::net::error::ApiError;
use crate::net::transport::Transport;
use crate::net::types::{LoginRequest, RegisterRequest, User};
use crate::session::SessionHandle;

const NAME_MIN_CHARS: usize = 3;
const NAME_MAX_CHARS: usize = 200;
const CPF_DIGITS: usize = 11;
const PASSWORD_MIN_CHARS: usize = 8;

/// Result of a successful sign-in.
#[derive(Debug, Clone, PartialEq)]
pub struct SignedIn {
    pub user: User,
    /// Where to navigate next.
    pub landing: &'static str,
}

/// Self-registration form as typed by the patient.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrationForm {
    pub name: String,
    pub email: String,
    /// Digits, optionally with `.`/`-` punctuation.
    pub cpf: String,
    pub password: String,
    pub phone: Option<String>,
}

/// Trim, lower-case and check the email; require a password.
///
/// # Errors
///
/// [`ApiError::InvalidInput`] naming the offending field.
pub fn validate_credentials(email: &str, password: &str) -> Result<LoginRequest, ApiError> {
    let email = email.trim().to_lowercase();
    if !looks_like_email(&email) {
        return Err(ApiError::invalid_input("email", "Email inválido"));
    }
    if password.is_empty() {
        return Err(ApiError::invalid_input("password", "Senha é obrigatória"));
    }
    Ok(LoginRequest { email, password: password.to_owned() })
}

/// Normalize a registration form into the wire request.
///
/// # Errors
///
/// [`ApiError::InvalidInput`] for the first field that fails.
pub fn validate_registration(form: &RegistrationForm) -> Result<RegisterRequest, ApiError> {
    let name = form.name.trim();
    let name_len = name.chars().count();
    if name_len < NAME_MIN_CHARS {
        return Err(ApiError::invalid_input("nome", "Nome deve ter no mínimo 3 caracteres"));
    }
    if name_len > NAME_MAX_CHARS {
        return Err(ApiError::invalid_input("nome", "Nome muito longo"));
    }

    let email = form.email.trim().to_lowercase();
    if !looks_like_email(&email) {
        return Err(ApiError::invalid_input("email", "Email inválido"));
    }

    let cpf: String = form.cpf.chars().filter(char::is_ascii_digit).collect();
    let only_punctuation = form.cpf.chars().all(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | ' '));
    if cpf.len() != CPF_DIGITS || !only_punctuation {
        return Err(ApiError::invalid_input("cpf", "CPF deve conter 11 dígitos"));
    }

    if form.password.chars().count() < PASSWORD_MIN_CHARS {
        return Err(ApiError::invalid_input("password", "Senha deve ter no mínimo 8 caracteres"));
    }

    let phone = form.phone.as_deref().map(str::trim).filter(|p| !p.is_empty()).map(str::to_owned);
    Ok(RegisterRequest {
        name: name.to_owned(),
        email,
        cpf,
        password: form.password.clone(),
        phone,
        birth_date: None,
    })
}

fn looks_like_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && !domain.is_empty() && !domain.contains('@'),
        None => false,
    }
}

/// Exchange credentials for tokens, load the profile and pick the landing page.
///
/// If the profile cannot be loaded the fresh tokens are discarded, so a
/// failed login never leaves a half-populated session behind.
///
/// # Errors
///
/// Local validation errors, [`ApiError::Unauthorized`] for bad credentials,
/// or whatever `/auth/me` returned.
pub async fn login<T: Transport>(
    api: &ApiClient<T>,
    session: &SessionHandle,
    email: &str,
    password: &str,
) -> Result<SignedIn, ApiError> {
    let credentials = validate_credentials(email, password)?;
    let pair = api.login(&credentials).await?;
    session.set_tokens(pair.access_token, pair.refresh_token);

    match api.me().await {
        Ok(user) => {
            tracing::info!(user_id = %user.id, role = %user.role, "signed in");
            let landing = home_path(user.role);
            session.set_user(user.clone());
            Ok(SignedIn { user, landing })
        }
        Err(e) => {
            tracing::warn!(error = %e, "profile fetch after login failed; discarding tokens");
            session.logout();
            Err(e)
        }
    }
}

/// Register a patient account, then sign in with the same credentials.
///
/// # Errors
///
/// Local validation errors, [`ApiError::Conflict`] when the email or CPF is
/// already registered, or any [`login`] error.
pub async fn register_then_login<T: Transport>(
    api: &ApiClient<T>,
    session: &SessionHandle,
    form: &RegistrationForm,
) -> Result<SignedIn, ApiError> {
    let request = validate_registration(form)?;
    let created = api.register(&request).await?;
    tracing::info!(user_id = %created.id, "patient registered");
    login(api, session, &request.email, &request.password).await
}

/// Revalidate a restored session against `/auth/me`.
///
/// Returns `Ok(None)` when there is nothing to restore. With no access token
/// the call goes through the refresh path. Rejections end the session;
/// network failures leave it in place for the next attempt.
///
/// # Errors
///
/// The `/auth/me` failure, after the session has been cleared if it was
/// rejected.
pub async fn bootstrap<T: Transport>(api: &ApiClient<T>, session: &SessionHandle) -> Result<Option<User>, ApiError> {
    let snapshot = session.snapshot();
    if !snapshot.is_authenticated && snapshot.refresh_token.is_none() {
        return Ok(None);
    }

    match api.me().await {
        Ok(user) => {
            session.set_user(user.clone());
            Ok(Some(user))
        }
        Err(e) if e.is_network() => {
            tracing::warn!(error = %e, "session revalidation deferred");
            Err(e)
        }
        Err(e) => {
            if !e.ends_session() {
                session.logout();
            }
            tracing::info!(error = %e, "restored session rejected");
            Err(e)
        }
    }
}

/// Sign out locally. Tokens are stateless on the server, so nothing is sent.
pub fn logout(session: &SessionHandle) {
    session.logout();
}
