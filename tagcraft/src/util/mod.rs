pub(crate) mod alloc;
pub mod io;
pub(crate) mod math;
pub(crate) mod text;

/// Parse a `current/total` pair, as used by track and disc fields
///
/// Either half may be missing or unparsable, which is reported as `None`.
pub(crate) fn split_pair(value: &str) -> (Option<u32>, Option<u32>) {
	let mut split = value.splitn(2, '/');

	let current = split.next().and_then(|c| c.trim().parse::<u32>().ok());
	let total = split.next().and_then(|t| t.trim().parse::<u32>().ok());

	(current, total)
}

#[cfg(test)]
mod tests {
	use super::split_pair;

	#[test_log::test]
	fn pairs() {
		assert_eq!(split_pair("5/12"), (Some(5), Some(12)));
		assert_eq!(split_pair("5"), (Some(5), None));
		assert_eq!(split_pair("/12"), (None, Some(12)));
		assert_eq!(split_pair(" 3 / 4 "), (Some(3), Some(4)));
		assert_eq!(split_pair("abc"), (None, None));
	}
}
