//! Login screen: the credential form with its password indicators, and the
//! sign-in / sign-up decision against the local store.
//!
//! Single-device model: the first credential entered becomes the account.
//! Later logins must match it exactly.

use tracing::{info, warn};

use crate::error::{AuthError, RepositoryError};
use crate::navigation::Route;
use crate::store::ProfileRepository;
use crate::validation::{
    Credential, CredentialForm, LiveForm, PasswordRequirement, RequirementStatus,
    requirement_statuses,
};

/// Sign-in against the stored account.
#[derive(Clone)]
pub struct AuthService {
    repo: ProfileRepository,
}

impl AuthService {
    pub fn new(repo: ProfileRepository) -> Self {
        Self { repo }
    }

    /// Sign in, or sign up when no account is stored.
    ///
    /// Returns where to navigate next: `/` for a returning user,
    /// `/onboarding` for a new one.
    pub async fn login(&self, credential: &Credential) -> Result<Route, AuthError> {
        let existing = match self.repo.load_credential().await {
            Ok(existing) => existing,
            Err(RepositoryError::Corrupt { key, reason }) => {
                warn!(key = %key, reason = %reason, "Stored user is corrupt, treating as new user");
                None
            }
            Err(e) => return Err(e.into()),
        };

        match existing {
            Some(stored) if stored.matches(credential) => {
                self.repo.set_authenticated(true).await?;
                info!(email = %credential.email, "Signed in");
                Ok(Route::Cover)
            }
            Some(_) => {
                info!(email = %credential.email, "Credential mismatch");
                Err(AuthError::CredentialMismatch)
            }
            None => {
                self.repo.save_credential(credential).await?;
                self.repo.set_authenticated(true).await?;
                info!(email = %credential.email, "New user registered");
                Ok(Route::Onboarding)
            }
        }
    }

    pub async fn logout(&self) -> Result<(), AuthError> {
        self.repo.set_authenticated(false).await?;
        info!("Signed out");
        Ok(())
    }

    pub async fn is_authenticated(&self) -> Result<bool, AuthError> {
        Ok(self.repo.is_authenticated().await?)
    }
}

/// View state of the login screen.
#[derive(Debug, Default)]
pub struct LoginScreen {
    form: LiveForm<CredentialForm>,
    show_password: bool,
}

impl LoginScreen {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn form(&self) -> &LiveForm<CredentialForm> {
        &self.form
    }

    pub fn set_email(&mut self, email: impl Into<String>) {
        let email = email.into();
        self.form.edit(|f| f.email = email);
    }

    pub fn set_password(&mut self, password: impl Into<String>) {
        let password = password.into();
        self.form.edit(|f| f.password = password);
    }

    pub fn blur_email(&mut self) {
        self.form.blur("email");
    }

    pub fn clear_email(&mut self) {
        self.set_email("");
    }

    pub fn clear_password(&mut self) {
        self.set_password("");
    }

    pub fn toggle_password_visibility(&mut self) -> bool {
        self.show_password = !self.show_password;
        self.show_password
    }

    pub fn password_visible(&self) -> bool {
        self.show_password
    }

    /// Email error, only once the field has been left.
    pub fn email_error(&self) -> Option<&str> {
        self.form.visible_error("email")
    }

    pub fn password_indicators(&self) -> [(PasswordRequirement, RequirementStatus); 4] {
        requirement_statuses(&self.form.input().password)
    }

    /// Enabled state of the start button.
    pub fn can_submit(&self) -> bool {
        self.form.is_valid()
    }

    /// Sign in with the form contents. A gated (invalid) form is rejected
    /// without revealing errors; those only appear once a field is left.
    pub async fn submit(&mut self, auth: &AuthService) -> Result<Route, AuthError> {
        if !self.form.is_valid() {
            return Err(AuthError::InvalidForm(self.form.errors().clone()));
        }
        let credential = self.form.submit().map_err(AuthError::InvalidForm)?;
        auth.login(&credential).await
    }
}
