//! Account commands: sign-up, sign-in, whoami, and resume.

use secrecy::SecretString;
use serde::Serialize;
use tracing::info;

use aora_backend::Backend;
use aora_core::{CurrentUser, Email, Username};

/// Print a value to stdout as pretty JSON.
#[allow(clippy::print_stdout)]
pub fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Register an account, sign it in, and create its profile.
///
/// # Errors
///
/// Returns an error if the inputs are invalid or any provisioning step fails.
pub async fn sign_up(
    backend: &Backend,
    email: &str,
    password: String,
    username: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let email = Email::parse(email)?;
    let username = Username::parse(username)?;
    let password = SecretString::from(password);

    let profile = backend
        .accounts()
        .create_user(&email, &password, &username)
        .await?;

    info!(document_id = %profile.id, "Sign-up complete");
    print_json(&profile)
}

/// Sign in and print the session.
///
/// # Errors
///
/// Returns an error if the email is invalid or the credentials are rejected.
pub async fn sign_in(
    backend: &Backend,
    email: &str,
    password: String,
) -> Result<(), Box<dyn std::error::Error>> {
    let email = Email::parse(email)?;
    let password = SecretString::from(password);

    let session = backend.accounts().sign_in(&email, &password).await?;
    print_json(&session)
}

/// Print the current user, signing in first when credentials are given.
///
/// Without credentials there is no session in a fresh process, so this
/// reports `unauthenticated`.
///
/// # Errors
///
/// Returns an error if sign-in or the lookup fails.
pub async fn whoami(
    backend: &Backend,
    credentials: Option<(String, String)>,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Some((email, password)) = credentials {
        let email = Email::parse(&email)?;
        backend
            .accounts()
            .sign_in(&email, &SecretString::from(password))
            .await?;
    }

    let user = backend.accounts().get_current_user().await?;
    if let CurrentUser::ProfileMissing { account_id } = &user {
        info!(%account_id, "Run `aora resume` to create the missing profile");
    }
    print_json(&user)
}

/// Sign in and create the profile record if it is missing.
///
/// # Errors
///
/// Returns an error if sign-in or profile creation fails.
pub async fn resume(
    backend: &Backend,
    email: &str,
    password: String,
) -> Result<(), Box<dyn std::error::Error>> {
    let email = Email::parse(email)?;
    backend
        .accounts()
        .sign_in(&email, &SecretString::from(password))
        .await?;

    let profile = backend.accounts().resume_provisioning().await?;
    print_json(&profile)
}
