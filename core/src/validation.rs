// marketplace/core/src/validation.rs

//! Field-level input checks. Failures are collected so a client sees every
//! rejected field at once.

use crate::error::{FieldError, MarketError, MarketResult};

pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Default)]
pub struct FieldErrors(Vec<FieldError>);

impl FieldErrors {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn push(&mut self, field: &str, reason: impl Into<String>) {
    self.0.push(FieldError::new(field, reason));
  }

  /// Non-blank text. Returns whether the check passed.
  pub fn required(&mut self, field: &str, value: &str) -> bool {
    if value.trim().is_empty() {
      self.push(field, "required");
      false
    } else {
      true
    }
  }

  /// A value the client had to send. `None` is reported as required.
  pub fn present<T>(&mut self, field: &str, value: Option<T>) -> Option<T> {
    if value.is_none() {
      self.push(field, "required");
    }
    value
  }

  pub fn email(&mut self, field: &str, value: &str) {
    if self.required(field, value) && !looks_like_email(value) {
      self.push(field, "email");
    }
  }

  pub fn password(&mut self, field: &str, value: &str) {
    if value.chars().count() < MIN_PASSWORD_LEN {
      self.push(field, format!("min={}", MIN_PASSWORD_LEN));
    }
  }

  pub fn non_negative(&mut self, field: &str, value: i64) {
    if value < 0 {
      self.push(field, "gte=0");
    }
  }

  pub fn positive(&mut self, field: &str, value: i64) {
    if value <= 0 {
      self.push(field, "gt=0");
    }
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  pub fn into_result(self) -> MarketResult<()> {
    if self.0.is_empty() {
      Ok(())
    } else {
      Err(MarketError::Validation(self.0))
    }
  }
}

// A single '@' with a non-empty local part and a dotted domain.
fn looks_like_email(value: &str) -> bool {
  let Some((local, domain)) = value.split_once('@') else {
    return false;
  };
  !local.is_empty()
    && !domain.contains('@')
    && !value.chars().any(char::is_whitespace)
    && domain
      .split_once('.')
      .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty() && !tld.ends_with('.'))
}
