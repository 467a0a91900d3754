use serde::{Deserialize, Serialize};
use std::fmt;

/// Credentials for one account, handed to the fetcher per request sequence.
#[derive(Clone, PartialEq, Eq)]
pub struct RequestContext {
    /// YYYY-MM-DD
    pub birthday: String,
    pub login: String,
    pub password: String,
}

impl RequestContext {
    pub fn new(
        birthday: impl Into<String>,
        login: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            birthday: birthday.into(),
            login: login.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestContext")
            .field("birthday", &"***")
            .field("login", &self.login)
            .field("password", &"***")
            .finish()
    }
}

#[derive(Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub birthdate: String,
    pub client_info: ClientInfo,
    pub fingerprint: String,
    pub login: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct ClientInfo {
    pub application: &'static str,
    pub channel: &'static str,
    pub universe: &'static str,
}

impl Default for ClientInfo {
    fn default() -> Self {
        Self {
            application: "BETCLIC.FR",
            channel: "WEB_BETCLIC.FR",
            universe: "sport",
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct LoginResponse {
    pub status: String,
    #[serde(default)]
    pub token: serde_json::Value,
}

/// Token obtained from a validated login, sent back as `X-CLIENT`.
#[derive(Clone)]
pub struct AuthenticatedSession {
    pub(crate) client_header: String,
}

impl fmt::Debug for AuthenticatedSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthenticatedSession(***)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_secrets() {
        let ctx = RequestContext::new("1990-01-31", "jdoe", "hunter2");
        let shown = format!("{:?}", ctx);
        assert!(shown.contains("jdoe"));
        assert!(!shown.contains("hunter2"));
        assert!(!shown.contains("1990"));
    }

    #[test]
    fn test_login_request_shape() {
        let req = LoginRequest {
            birthdate: "1990-01-31T00:00:00.000Z".to_string(),
            client_info: ClientInfo::default(),
            fingerprint: "fp".to_string(),
            login: "jdoe",
            password: "pw",
        };
        let v = serde_json::to_value(&req).unwrap();
        assert_eq!(v["client_info"]["channel"], "WEB_BETCLIC.FR");
        assert_eq!(v["birthdate"], "1990-01-31T00:00:00.000Z");
    }
}
