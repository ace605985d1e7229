//! The two sides of a conversation.
//!
//! Every conversation is a fixed star: one regular user talking to the single
//! site owner. [`Participant`] makes that explicit instead of comparing raw
//! strings against `"admin"` all over the place.

use std::fmt;

/// Wire and storage identifier of the site owner.
pub const ADMIN_ID: &str = "admin";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Participant {
    Admin,
    User(String),
}

impl Participant {
    /// Identifier as stored in `from_id` / `to_id`.
    pub fn as_str(&self) -> &str {
        match self {
            Participant::Admin => ADMIN_ID,
            Participant::User(id) => id,
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Participant::Admin)
    }
}

impl From<&str> for Participant {
    fn from(raw: &str) -> Self {
        if raw == ADMIN_ID {
            Participant::Admin
        } else {
            Participant::User(raw.to_owned())
        }
    }
}

impl From<String> for Participant {
    fn from(raw: String) -> Self {
        if raw == ADMIN_ID {
            Participant::Admin
        } else {
            Participant::User(raw)
        }
    }
}

impl fmt::Display for Participant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returns the non-admin side of a `from`/`to` pair, or `None` when the pair
/// is not a valid admin ↔ user edge (two users, or admin talking to itself).
pub fn conversation_key<'a>(from: &'a Participant, to: &'a Participant) -> Option<&'a str> {
    match (from, to) {
        (Participant::Admin, Participant::User(id)) | (Participant::User(id), Participant::Admin) => {
            Some(id)
        }
        _ => None,
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn admin_literal_parses_to_admin() {
        assert_eq!(Participant::from("admin"), Participant::Admin);
        assert_eq!(Participant::from("Admin"), Participant::User("Admin".into()));
        assert_eq!(Participant::from("user_42").to_string(), "user_42");
    }

    #[test]
    fn conversation_key_requires_exactly_one_admin() {
        let admin = Participant::Admin;
        let u1 = Participant::from("u1");
        let u2 = Participant::from("u2");
        assert_eq!(conversation_key(&admin, &u1), Some("u1"));
        assert_eq!(conversation_key(&u1, &admin), Some("u1"));
        assert_eq!(conversation_key(&u1, &u2), None);
        assert_eq!(conversation_key(&admin, &admin), None);
    }
}
