use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A package version with an optional epoch, e.g. `1!2.0.1rc3`.
///
/// The version string is tokenized into numeric and textual segments at
/// parse time so comparisons do not re-scan the string. Separators (`.`,
/// `-`, `_`) only delimit segments and do not take part in ordering, so
/// `1.0rc1` and `1.0-rc1` compare equal.
#[derive(Debug, Clone)]
pub struct PackageVersion {
	epoch: u32,
	segments: Vec<Segment>,
	raw: String,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
enum Segment {
	Number(u64),
	Text(String),
}

const PRERELEASE_MARKERS: &[&str] = &["a", "b", "c", "rc", "alpha", "beta", "pre", "preview", "dev"];

impl PackageVersion {
	pub fn new(version: &str) -> crate::Result<Self> {
		let raw = version.trim();
		if raw.is_empty() {
			return Err(crate::Error::Parse("empty version string".to_string()));
		}

		let (epoch, rest) = match raw.split_once('!') {
			Some((e, rest)) => {
				let epoch = e.parse::<u32>()
					.map_err(|_| crate::Error::Parse(format!("invalid epoch in version {:?}", raw)))?;
				(epoch, rest)
			}
			None => (0, raw),
		};

		let segments = tokenize(rest);
		if segments.is_empty() {
			return Err(crate::Error::Parse(format!("version {:?} has no comparable segments", raw)));
		}

		Ok(PackageVersion { epoch, segments, raw: raw.to_string() })
	}

	pub fn epoch(&self) -> u32 {
		self.epoch
	}

	/// Whether any segment marks this as a pre-release (`rc`, `beta`, ...).
	pub fn is_prerelease(&self) -> bool {
		self.segments.iter().any(|s| {
			if let Segment::Text(t) = s {
				PRERELEASE_MARKERS.contains(&t.to_ascii_lowercase().as_str())
			} else {
				false
			}
		})
	}
}

fn tokenize(s: &str) -> Vec<Segment> {
	let mut segments = Vec::new();
	let mut current = String::new();
	let mut numeric = false;

	let mut flush = |buf: &mut String, numeric: bool, out: &mut Vec<Segment>| {
		if buf.is_empty() {
			return;
		}
		if numeric {
			/* Oversized numeric runs are kept as text rather than rejected. */
			match buf.parse::<u64>() {
				Ok(n) => out.push(Segment::Number(n)),
				Err(_) => out.push(Segment::Text(std::mem::take(buf))),
			}
		} else {
			out.push(Segment::Text(buf.to_ascii_lowercase()));
		}
		buf.clear();
	};

	for c in s.chars() {
		if matches!(c, '.' | '-' | '_' | '+') {
			flush(&mut current, numeric, &mut segments);
			continue;
		}
		if c.is_ascii_digit() != numeric {
			flush(&mut current, numeric, &mut segments);
			numeric = c.is_ascii_digit();
		}
		current.push(c);
	}
	flush(&mut current, numeric, &mut segments);

	segments
}

impl PartialEq for PackageVersion {
	fn eq(&self, other: &Self) -> bool {
		self.cmp(other) == std::cmp::Ordering::Equal
	}
}

impl Eq for PackageVersion {}

impl std::hash::Hash for PackageVersion {
	fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
		self.epoch.hash(state);
		self.segments.hash(state);
	}
}

impl Ord for PackageVersion {
	fn cmp(&self, other: &Self) -> std::cmp::Ordering {
		use std::cmp::Ordering;

		match self.epoch.cmp(&other.epoch) {
			Ordering::Equal => {}
			ord => return ord,
		}

		let mut lhs = self.segments.iter();
		let mut rhs = other.segments.iter();
		loop {
			match (lhs.next(), rhs.next()) {
				(Some(a), Some(b)) => {
					let ord = match (a, b) {
						(Segment::Number(x), Segment::Number(y)) => x.cmp(y),
						(Segment::Text(x), Segment::Text(y)) => x.cmp(y),
						/* A textual segment marks a lower precedence than any number,
						 * so `1.0.rc` sorts before `1.0.0`. */
						(Segment::Text(_), Segment::Number(_)) => Ordering::Less,
						(Segment::Number(_), Segment::Text(_)) => Ordering::Greater,
					};
					if ord != Ordering::Equal {
						return ord;
					}
				}
				/* `1.0rc1` < `1.0` < `1.0.1` */
				(Some(Segment::Text(_)), None) => return Ordering::Less,
				(Some(Segment::Number(_)), None) => return Ordering::Greater,
				(None, Some(Segment::Text(_))) => return Ordering::Greater,
				(None, Some(Segment::Number(_))) => return Ordering::Less,
				(None, None) => return Ordering::Equal,
			}
		}
	}
}

impl PartialOrd for PackageVersion {
	fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
		Some(self.cmp(other))
	}
}

impl std::fmt::Display for PackageVersion {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.raw)
	}
}

impl std::str::FromStr for PackageVersion {
	type Err = crate::Error;
	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::new(s)
	}
}

impl TryFrom<String> for PackageVersion {
	type Error = crate::Error;
	fn try_from(value: String) -> Result<Self, Self::Error> {
		Self::new(&value)
	}
}

impl Serialize for PackageVersion {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.serialize_str(&self.raw)
	}
}

impl<'de> Deserialize<'de> for PackageVersion {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		let s = String::deserialize(deserializer)?;
		PackageVersion::new(&s).map_err(D::Error::custom)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn v(s: &str) -> PackageVersion {
		PackageVersion::new(s).expect("test version should parse")
	}

	#[test]
	fn ordering_numeric() {
		assert!(v("1.0.0") < v("1.0.1"));
		assert!(v("1.9") < v("1.10"));
		assert!(v("2.0") > v("1.99.99"));
	}

	#[test]
	fn ordering_prerelease() {
		assert!(v("1.0rc1") < v("1.0"));
		assert!(v("1.0") < v("1.0.1"));
		assert!(v("2.0.0rc1") < v("2.0.0rc2"));
	}

	#[test]
	fn ordering_epoch() {
		assert!(v("1!1.0") > v("99.0"));
		assert_eq!(v("0!1.0"), v("1.0"));
	}

	#[test]
	fn separators_do_not_matter() {
		assert_eq!(v("1.0rc1"), v("1.0-rc1"));
		assert_eq!(v("1_0"), v("1.0"));
	}

	#[test]
	fn prerelease_detection() {
		assert!(v("3.1.0rc1").is_prerelease());
		assert!(v("1.0b2").is_prerelease());
		assert!(v("2.0.dev1").is_prerelease());
		assert!(!v("3.1.0").is_prerelease());
	}

	#[test]
	fn rejects_garbage() {
		assert!(PackageVersion::new("").is_err());
		assert!(PackageVersion::new("..").is_err());
		assert!(PackageVersion::new("x!1.0").is_err());
	}

	#[test]
	fn display_round_trip() {
		assert_eq!(v("1!2.0.1rc3").to_string(), "1!2.0.1rc3");
	}
}
