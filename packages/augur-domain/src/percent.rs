use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Hundredths of a percent in a full probability mass.
pub const FULL_HUNDREDTHS: u32 = 10_000;

/// A probability percentage held as integer hundredths, so `100.00` is an exact sum.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Percentage(u32);
impl Percentage {
	pub const ZERO: Self = Self(0);
	pub const HUNDRED: Self = Self(FULL_HUNDREDTHS);

	pub const fn from_hundredths(hundredths: u32) -> Option<Self> {
		if hundredths > FULL_HUNDREDTHS {
			return None;
		}

		Some(Self(hundredths))
	}

	pub const fn saturating(hundredths: u32) -> Self {
		if hundredths > FULL_HUNDREDTHS {
			return Self::HUNDRED;
		}

		Self(hundredths)
	}

	pub fn from_f64(value: f64) -> Option<Self> {
		if !value.is_finite() || !(0.0..=100.0).contains(&value) {
			return None;
		}

		Self::from_hundredths((value * 100.0).round() as u32)
	}

	pub const fn hundredths(self) -> u32 {
		self.0
	}

	pub fn as_f64(self) -> f64 {
		f64::from(self.0) / 100.0
	}
}
impl fmt::Display for Percentage {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
	}
}
impl Serialize for Percentage {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		serializer.serialize_f64(self.as_f64())
	}
}
impl<'de> Deserialize<'de> for Percentage {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		let raw = f64::deserialize(deserializer)?;

		Self::from_f64(raw).ok_or_else(|| {
			serde::de::Error::custom(format!("Percentage must be within 0-100, got {raw}."))
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn displays_two_decimals() {
		assert_eq!(Percentage::from_hundredths(3_334).map(|p| p.to_string()), Some("33.34".into()));
		assert_eq!(Percentage::from_hundredths(5).map(|p| p.to_string()), Some("0.05".into()));
		assert_eq!(Percentage::HUNDRED.to_string(), "100.00");
	}

	#[test]
	fn rejects_out_of_range_values() {
		assert_eq!(Percentage::from_hundredths(10_001), None);
		assert_eq!(Percentage::from_f64(-0.5), None);
		assert_eq!(Percentage::from_f64(f64::NAN), None);
		assert_eq!(Percentage::from_f64(27.27), Percentage::from_hundredths(2_727));
	}

	#[test]
	fn serializes_as_decimal_number() {
		let value = Percentage::from_hundredths(1_818).expect("valid percentage");

		assert_eq!(serde_json::to_string(&value).expect("serialize"), "18.18");

		let parsed: Percentage = serde_json::from_str("27.27").expect("deserialize");

		assert_eq!(parsed.hundredths(), 2_727);
	}
}
