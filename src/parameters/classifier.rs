// Credential Key Classification
//
// Decides whether a field name looks like it carries a username or a password.
// The vocabularies are fixed and disjoint, so a key is never both.
//
// Example:
//   Input:  key="Password", value="hunter2"
//   Output: Some(Category::Passwords)
//
// Used by: scanner.rs (query, form, multipart), walker.rs (JSON), body.rs (XML)

use crate::models::{Category, Harvest};

pub const USER_KEYS: &[&str] = &["u", "user", "username", "login", "email"];
pub const PASS_KEYS: &[&str] = &["p", "pass", "passwd", "password", "token", "pwd"];

/// What a credential-shaped field holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialKind {
    Username,
    Password,
}

impl CredentialKind {
    pub fn category(self) -> Category {
        match self {
            CredentialKind::Username => Category::Users,
            CredentialKind::Password => Category::Passwords,
        }
    }
}

pub struct CredentialClassifier;

impl CredentialClassifier {
    /// Case-insensitive match against the user and password vocabularies.
    pub fn classify(key: &str) -> Option<CredentialKind> {
        let key = key.to_lowercase();
        if USER_KEYS.contains(&key.as_str()) {
            Some(CredentialKind::Username)
        } else if PASS_KEYS.contains(&key.as_str()) {
            Some(CredentialKind::Password)
        } else {
            None
        }
    }

    /// Every key the XML scan looks for: user keys first, then password keys.
    pub fn candidate_keys() -> impl Iterator<Item = &'static str> {
        USER_KEYS.iter().chain(PASS_KEYS.iter()).copied()
    }

    /// Routes `value` into users or passwords when `key` is credential-shaped.
    /// Separate keys are never paired into combos.
    pub fn inspect(harvest: &mut Harvest, key: &str, value: &str) {
        if let Some(kind) = Self::classify(key) {
            harvest.record(kind.category(), value);
        }
    }
}
