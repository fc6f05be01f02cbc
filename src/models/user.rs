//! User Schema

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde_json::{json, Value};

use super::{check_one_of, require_string, Resource};
use crate::store::{Collection, Store};

/// Role tag attached to every user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Guide,
    LeadGuide,
    Admin,
}

impl Role {
    pub const ALL: &'static [&'static str] = &["user", "guide", "lead-guide", "admin"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Guide => "guide",
            Self::LeadGuide => "lead-guide",
            Self::Admin => "admin",
        }
    }
}

impl FromStr for Role {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "guide" => Ok(Self::Guide),
            "lead-guide" => Ok(Self::LeadGuide),
            "admin" => Ok(Self::Admin),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An account record
pub struct User;

impl User {
    /// Whether an email address is well formed
    pub fn is_valid_email(email: &str) -> bool {
        static EMAIL_RE: OnceLock<Regex> = OnceLock::new();
        let re = EMAIL_RE.get_or_init(|| {
            Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email regex is valid")
        });
        re.is_match(email)
    }
}

impl Resource for User {
    const COLLECTION: &'static str = "users";
    const UNIQUE_FIELDS: &'static [&'static str] = &["email"];
    // Credentials and the soft-delete flag never leave the server
    const HIDDEN_FIELDS: &'static [&'static str] =
        &["password_hash", "password_changed_at", "active"];

    fn collection(store: &Store) -> &Collection {
        &store.users
    }

    fn apply_defaults(doc: &mut Value) {
        let Some(fields) = doc.as_object_mut() else {
            return;
        };
        fields.entry("role").or_insert(json!(Role::User.as_str()));
        fields.entry("active").or_insert(json!(true));
    }

    fn validate(doc: &Value) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        require_string(doc, "name", "Please tell us your name", &mut errors);
        require_string(doc, "email", "Please provide your email", &mut errors);
        if let Some(email) = doc.get("email").and_then(Value::as_str) {
            if !email.trim().is_empty() && !Self::is_valid_email(email) {
                errors.push("Please provide a valid email".to_string());
            }
        }
        check_one_of(
            doc,
            "role",
            Role::ALL,
            "Role is either: user, guide, lead-guide, admin",
            &mut errors,
        );

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
