use chrono::{DateTime, Utc};

/// Current wall-clock time, RFC3339-formatted — the format every `start_time`
/// and stream `timestamp` field in the KV schema is stored as.
#[must_use]
pub fn now_rfc3339() -> String { Utc::now().to_rfc3339() }

/// Seconds elapsed between an RFC3339 `start_time` (as stored by room
/// creation) and now. Returns 0 on a malformed timestamp rather than
/// failing the terminate flow over a formatting mismatch.
#[must_use]
pub fn elapsed_seconds_since(start_time: &str) -> i64 {
	let Ok(start) = DateTime::parse_from_rfc3339(start_time) else {
		return 0;
	};
	(Utc::now() - start.with_timezone(&Utc)).num_seconds().max(0)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn elapsed_seconds_is_monotonic_and_nonnegative() {
		let start = now_rfc3339();
		std::thread::sleep(std::time::Duration::from_millis(10));
		assert!(elapsed_seconds_since(&start) >= 0);
	}

	#[test]
	fn malformed_timestamp_yields_zero() { assert_eq!(elapsed_seconds_since("not-a-time"), 0); }
}
