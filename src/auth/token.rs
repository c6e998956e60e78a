//! Cached bearer token and its expiry arithmetic.

pub mod secret;

pub use secret::*;

// crates.io
use time::Date;
// self
use crate::_prelude::*;

/// Margin subtracted from the server-reported lifetime so tokens are refreshed before the
/// API would reject them.
pub const MINIMUM_REMAINING_VALIDITY: Duration = Duration::seconds(10);

/// Bearer token paired with the instant after which it must not be reused.
#[derive(Clone)]
pub struct AccessToken {
	/// Token value; callers must avoid logging it.
	pub secret: TokenSecret,
	/// Instant at which the token stops being usable.
	pub expires_at: OffsetDateTime,
}
impl AccessToken {
	/// Builds a token issued at `issued_at` with a server-reported lifetime of `ttl`.
	///
	/// The expiry is `issued_at + ttl - MINIMUM_REMAINING_VALIDITY`, so a lifetime at or
	/// below the margin yields a token that is already stale. Lifetimes past the
	/// representable range saturate: a huge positive one never expires, a huge negative one
	/// is stale on arrival.
	pub fn issued(secret: TokenSecret, issued_at: OffsetDateTime, ttl: Duration) -> Self {
		let expires_at = issued_at
			.checked_add(ttl)
			.and_then(|at| at.checked_sub(MINIMUM_REMAINING_VALIDITY))
			.unwrap_or_else(|| {
				if ttl.is_positive() { Date::MAX.midnight().assume_utc() } else { issued_at }
			});

		Self { secret, expires_at }
	}

	/// Returns `true` while `now` is strictly before the expiry.
	pub fn is_usable_at(&self, now: OffsetDateTime) -> bool {
		!self.secret.is_empty() && now < self.expires_at
	}

	/// Convenience helper that checks usability against the current UTC instant.
	pub fn is_usable(&self) -> bool {
		self.is_usable_at(OffsetDateTime::now_utc())
	}
}
impl Debug for AccessToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AccessToken")
			.field("secret", &"<redacted>")
			.field("expires_at", &self.expires_at)
			.finish()
	}
}
