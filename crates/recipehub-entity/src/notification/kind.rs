//! Notification kind enum, stored as lowercase text.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The action that produced a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    /// Someone liked a recipe. A toggle: at most one row per
    /// (recipient, sender, recipe).
    Like,
    /// Someone commented on a recipe. Additive.
    Comment,
    /// Someone rated a recipe. Additive.
    Rating,
    /// Someone followed a user. Additive.
    Follow,
}

impl NotificationKind {
    /// The lowercase database/wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Like => "like",
            Self::Comment => "comment",
            Self::Rating => "rating",
            Self::Follow => "follow",
        }
    }

    /// Whether this kind toggles (one row per key) rather than accumulates.
    pub fn is_toggle(&self) -> bool {
        matches!(self, Self::Like)
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NotificationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "like" => Ok(Self::Like),
            "comment" => Ok(Self::Comment),
            "rating" => Ok(Self::Rating),
            "follow" => Ok(Self::Follow),
            other => Err(format!("unknown notification kind: {other}")),
        }
    }
}

impl sqlx::Type<sqlx::Postgres> for NotificationKind {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <&str as sqlx::Type<sqlx::Postgres>>::type_info()
    }
}

impl<'q> sqlx::Encode<'q, sqlx::Postgres> for NotificationKind {
    fn encode_by_ref(
        &self,
        buf: &mut <sqlx::Postgres as sqlx::Database>::ArgumentBuffer<'q>,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <&str as sqlx::Encode<'q, sqlx::Postgres>>::encode_by_ref(&self.as_str(), buf)
    }
}

impl<'r> sqlx::Decode<'r, sqlx::Postgres> for NotificationKind {
    fn decode(
        value: <sqlx::Postgres as sqlx::Database>::ValueRef<'r>,
    ) -> Result<Self, sqlx::error::BoxDynError> {
        let text = <&str as sqlx::Decode<'r, sqlx::Postgres>>::decode(value)?;
        text.parse().map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip_str() {
        for kind in [
            NotificationKind::Like,
            NotificationKind::Comment,
            NotificationKind::Rating,
            NotificationKind::Follow,
        ] {
            assert_eq!(kind.as_str().parse::<NotificationKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&NotificationKind::Like).unwrap();
        assert_eq!(json, "\"like\"");
    }

    #[test]
    fn test_only_like_toggles() {
        assert!(NotificationKind::Like.is_toggle());
        assert!(!NotificationKind::Comment.is_toggle());
        assert!(!NotificationKind::Rating.is_toggle());
    }
}
