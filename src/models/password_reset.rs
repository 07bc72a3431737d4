use chrono::{DateTime, Duration, Utc};
use sqlx::FromRow;
use uuid::Uuid;

pub const RESET_TOKEN_LIFETIME_HOURS: i64 = 1;

/// A single-use password reset token. `used_at` is set exactly once, inside
/// the same transaction that replaces the password hash.
#[derive(Debug, FromRow)]
pub struct PasswordResetToken {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub used_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl PasswordResetToken {
    pub fn issue(user_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            token: Uuid::new_v4().simple().to_string(),
            expires_at: now + Duration::hours(RESET_TOKEN_LIFETIME_HOURS),
            used_at: None,
            created_at: now,
        }
    }

    pub fn is_redeemable(&self, at: DateTime<Utc>) -> bool {
        self.used_at.is_none() && self.expires_at > at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_token_is_redeemable() {
        let token = PasswordResetToken::issue(Uuid::new_v4());
        assert!(token.is_redeemable(Utc::now()));
        assert_eq!(token.token.len(), 32);
    }

    #[test]
    fn test_used_token_is_not_redeemable() {
        let mut token = PasswordResetToken::issue(Uuid::new_v4());
        token.used_at = Some(Utc::now());
        assert!(!token.is_redeemable(Utc::now()));
    }

    #[test]
    fn test_expired_token_is_not_redeemable() {
        let token = PasswordResetToken::issue(Uuid::new_v4());
        let after_expiry = token.expires_at + Duration::seconds(1);
        assert!(!token.is_redeemable(after_expiry));
    }
}
