//! Cookie-carried credentials.

use std::collections::HashMap;

/// Cookie holding the username.
pub const USERNAME_COOKIE: &str = "u";

/// Cookie holding the plaintext password.
pub const PASSWORD_COOKIE: &str = "p";

/// Username/password pair sent with every request.
///
/// Nothing is persisted server-side; a request without these cookies is
/// anonymous.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    /// Value of the `u` cookie.
    pub username: Option<String>,
    /// Value of the `p` cookie.
    pub password: Option<String>,
}

impl Credentials {
    /// Creates credentials from a username and password.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
            password: Some(password.into()),
        }
    }

    /// Extracts credentials from a parsed cookie map.
    pub fn from_cookies(cookies: &HashMap<String, String>) -> Self {
        Self {
            username: cookies
                .get(USERNAME_COOKIE)
                .filter(|u| !u.is_empty())
                .cloned(),
            password: cookies.get(PASSWORD_COOKIE).cloned(),
        }
    }
}

// Passwords must never reach the logs.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .finish()
    }
}
