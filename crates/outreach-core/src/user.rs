//! Users: the account that owns contacts and sends mail.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result, check_email, require};

pub type UserId = i64;

/// A registered account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
  pub user_id:              UserId,
  pub full_name:            String,
  pub email:                String,
  /// argon2 PHC string, e.g. `$argon2id$v=19$…`
  #[serde(skip_serializing)]
  pub password_hash:        String,
  /// Physical location of the stored resume, if one was uploaded.
  pub resume_path:          Option<String>,
  /// The filename the resume was uploaded under.
  pub resume_original_name: Option<String>,
  pub created_at:           DateTime<Utc>,
}

impl User {
  pub fn has_resume(&self) -> bool {
    self.resume_path.as_deref().is_some_and(|p| !p.trim().is_empty())
  }
}

/// Input to [`UserStore::create_user`](crate::store::UserStore::create_user).
#[derive(Debug, Clone)]
pub struct NewUser {
  pub full_name:     String,
  pub email:         String,
  pub password_hash: String,
}

/// Check signup input before the password is hashed.
pub fn validate_signup(full_name: &str, email: &str, password: &str) -> Result<()> {
  require("full_name", full_name)?;
  let name_len = full_name.trim().chars().count();
  if !(2..=100).contains(&name_len) {
    return Err(Error::Length { field: "full_name", min: 2, max: 100 });
  }
  check_email(email)?;
  require("password", password)?;
  let pw_len = password.chars().count();
  if !(6..=100).contains(&pw_len) {
    return Err(Error::Length { field: "password", min: 6, max: 100 });
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn signup_rules() {
    assert!(validate_signup("Sam Lee", "sam@example.com", "hunter22").is_ok());
    assert!(matches!(
      validate_signup("S", "sam@example.com", "hunter22"),
      Err(Error::Length { field: "full_name", .. })
    ));
    assert!(matches!(
      validate_signup("Sam Lee", "sam@example.com", "short"),
      Err(Error::Length { field: "password", .. })
    ));
    assert_eq!(
      validate_signup("Sam Lee", "sam.example.com", "hunter22"),
      Err(Error::InvalidEmail)
    );
  }

  #[test]
  fn blank_resume_path_is_no_resume() {
    let mut u = User {
      user_id:              1,
      full_name:            "Sam Lee".into(),
      email:                "sam@example.com".into(),
      password_hash:        String::new(),
      resume_path:          Some("  ".into()),
      resume_original_name: None,
      created_at:           Utc::now(),
    };
    assert!(!u.has_resume());
    u.resume_path = Some("/srv/uploads/a.pdf".into());
    assert!(u.has_resume());
  }
}
