//! Signup and login.

use reqwest::Method;
use tracing::instrument;

use super::conversions::{LoginRecord, convert_login};
use super::types::{Acknowledgement, Credentials, LoginSession, SignupRequest};
use super::{ApiClient, ApiError};

impl ApiClient {
    /// Create an account. Does not log in.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the backend rejects the signup.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn signup(&self, request: &SignupRequest) -> Result<Acknowledgement, ApiError> {
        let builder = self.request(Method::POST, "/signup").json(&request.to_json());
        self.acknowledge(builder, "Failed to signup").await
    }

    /// Authenticate with email and password.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails, the credentials are rejected, or
    /// the response carries no usable user.
    #[instrument(skip(self, credentials), fields(email = %credentials.email))]
    pub async fn login(&self, credentials: &Credentials) -> Result<LoginSession, ApiError> {
        let builder = self
            .request(Method::POST, "/login")
            .json(&credentials.to_json());
        let record: LoginRecord = self.fetch(builder, "Failed to login").await?;
        convert_login(record)
    }
}
