use std::time::Duration;

/// Perform a rounded division.
///
/// This is implemented for all unsigned integers.
pub(crate) trait RoundedDivision<Rhs = Self> {
	type Output;

	fn div_round(self, rhs: Rhs) -> Self::Output;
}

macro_rules! unsigned_rounded_division {
	($($t:ty),*) => {
		$(
			impl RoundedDivision for $t {
				type Output = $t;

				fn div_round(self, rhs: Self) -> Self::Output {
					(self + (rhs >> 1)) / rhs
				}
			}
		)*
	};
}

unsigned_rounded_division!(u32, u64, u128);

/// The bitrate in kbps of `len` bytes played over `duration`
///
/// A zero duration gives a zero bitrate.
pub(crate) fn kbps(len: u64, duration: Duration) -> u32 {
	let millis = duration.as_millis();
	if millis == 0 {
		return 0;
	}

	// bytes * 8 / millis == kbit/s
	(u128::from(len) * 8).div_round(millis) as u32
}
