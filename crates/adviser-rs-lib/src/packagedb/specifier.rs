use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::PackageVersion;

/// A requirement on package versions, e.g. `>=1.0,<3` or `==2.5.0`.
///
/// An empty clause list matches every version and is written `*`.
/// Intersection of two specifiers is the concatenation of their clauses,
/// which keeps intersection cheap at the cost of not detecting emptiness
/// eagerly; an unsatisfiable specifier simply matches no candidate.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct VersionSpecifier {
	clauses: Vec<Clause>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Clause {
	op: Op,
	version: PackageVersion,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
	Eq,
	Ne,
	Ge,
	Le,
	Gt,
	Lt,
}

impl Op {
	fn as_str(self) -> &'static str {
		match self {
			Op::Eq => "==",
			Op::Ne => "!=",
			Op::Ge => ">=",
			Op::Le => "<=",
			Op::Gt => ">",
			Op::Lt => "<",
		}
	}
}

impl VersionSpecifier {
	/// The specifier matching any version.
	pub fn any() -> Self {
		Self::default()
	}

	pub fn is_any(&self) -> bool {
		self.clauses.is_empty()
	}

	pub fn parse(input: &str) -> crate::Result<Self> {
		let input = input.trim();
		if input.is_empty() || input == "*" {
			return Ok(Self::any());
		}

		let clause_re = regex::Regex::new(r"^(==|!=|>=|<=|>|<)\s*(.+)$")
			.expect("clause pattern is valid");

		let mut clauses = Vec::new();
		for part in input.split(',') {
			let part = part.trim();
			let captures = clause_re.captures(part)
				.ok_or_else(|| crate::Error::Parse(format!("invalid specifier clause {:?}", part)))?;
			let op = match &captures[1] {
				"==" => Op::Eq,
				"!=" => Op::Ne,
				">=" => Op::Ge,
				"<=" => Op::Le,
				">" => Op::Gt,
				"<" => Op::Lt,
				_ => unreachable!("pattern only matches known operators"),
			};
			let version = PackageVersion::new(&captures[2])?;
			clauses.push(Clause { op, version });
		}

		Ok(VersionSpecifier { clauses })
	}

	pub fn matches(&self, version: &PackageVersion) -> bool {
		self.clauses.iter().all(|c| match c.op {
			Op::Eq => *version == c.version,
			Op::Ne => *version != c.version,
			Op::Ge => *version >= c.version,
			Op::Le => *version <= c.version,
			Op::Gt => *version > c.version,
			Op::Lt => *version < c.version,
		})
	}

	/// Combine two specifiers into one satisfied only by versions matching both.
	pub fn intersect(&self, other: &Self) -> Self {
		let mut clauses = self.clauses.clone();
		for clause in &other.clauses {
			if !clauses.contains(clause) {
				clauses.push(clause.clone());
			}
		}
		VersionSpecifier { clauses }
	}
}

impl std::fmt::Display for VersionSpecifier {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		if self.clauses.is_empty() {
			return write!(f, "*");
		}
		let mut first = true;
		for clause in &self.clauses {
			if !first {
				write!(f, ",")?;
			}
			write!(f, "{}{}", clause.op.as_str(), clause.version)?;
			first = false;
		}
		Ok(())
	}
}

impl std::str::FromStr for VersionSpecifier {
	type Err = crate::Error;
	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::parse(s)
	}
}

impl Serialize for VersionSpecifier {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.serialize_str(&self.to_string())
	}
}

impl<'de> Deserialize<'de> for VersionSpecifier {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		let s = String::deserialize(deserializer)?;
		VersionSpecifier::parse(&s).map_err(D::Error::custom)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn v(s: &str) -> PackageVersion {
		PackageVersion::new(s).expect("test version should parse")
	}

	fn spec(s: &str) -> VersionSpecifier {
		VersionSpecifier::parse(s).expect("test specifier should parse")
	}

	#[test]
	fn any_matches_everything() {
		assert!(spec("").matches(&v("0.0.1")));
		assert!(spec("*").matches(&v("99!1")));
	}

	#[test]
	fn range_clauses() {
		let s = spec(">=1,<3");
		assert!(s.matches(&v("1")));
		assert!(s.matches(&v("2.9.9")));
		assert!(!s.matches(&v("3")));
		assert!(!s.matches(&v("0.9")));
	}

	#[test]
	fn exact_and_exclusion() {
		assert!(spec("==2.0").matches(&v("2.0")));
		assert!(!spec("==2.0").matches(&v("2.0.1")));
		assert!(!spec("!=2.0").matches(&v("2.0")));
		assert!(spec("!=2.0").matches(&v("2.1")));
	}

	#[test]
	fn intersection_narrows() {
		let merged = spec(">=1").intersect(&spec("<2"));
		assert!(merged.matches(&v("1.5")));
		assert!(!merged.matches(&v("2.0")));
		/* Duplicate clauses are not repeated. */
		assert_eq!(spec(">=1").intersect(&spec(">=1")), spec(">=1"));
	}

	#[test]
	fn display_round_trip() {
		for s in ["*", ">=1.0,<3", "==2.5.0", "!=1.0,>0.5"] {
			assert_eq!(spec(s).to_string(), s);
		}
	}

	#[test]
	fn rejects_unknown_operator() {
		assert!(VersionSpecifier::parse("~=1.0").is_err());
		assert!(VersionSpecifier::parse(">=").is_err());
	}
}
