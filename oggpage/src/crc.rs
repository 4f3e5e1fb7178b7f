// Ogg uses the plain CRC-32 (polynomial 0x04C11DB7), without reflection,
// with an initial value of 0 and no final XOR.
const CRC_POLYNOMIAL: u32 = 0x04C1_1DB7;

const CRC_TABLE: [u32; 256] = {
	let mut table = [0_u32; 256];

	let mut i = 0;
	while i < 256 {
		let mut r = (i as u32) << 24;

		let mut bit = 0;
		while bit < 8 {
			r = if r & 0x8000_0000 == 0 {
				r << 1
			} else {
				(r << 1) ^ CRC_POLYNOMIAL
			};
			bit += 1;
		}

		table[i] = r;
		i += 1;
	}

	table
};

/// Calculates the CRC checksum for a page
///
/// NOTE: The page checksum field must be zeroed before calculating the checksum.
pub fn crc32(page: &[u8]) -> u32 {
	let mut crc = 0_u32;

	for byte in page {
		crc = (crc << 8) ^ CRC_TABLE[(((crc >> 24) as u8) ^ byte) as usize];
	}

	crc
}

#[cfg(test)]
mod tests {
	use super::crc32;

	#[test_log::test]
	fn empty_input() {
		assert_eq!(crc32(&[]), 0);
	}

	#[test_log::test]
	fn known_value() {
		// CRC-32/POSIX (cksum) check value, without the final inversion
		assert_eq!(crc32(b"123456789"), 0x89A1_897F);
	}
}
