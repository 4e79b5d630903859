//! Protocol version triple.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Version triple as sent in `Connect` and `RoomInfo`.
///
/// Serialized with the `"class": "Version"` marker the server expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "VersionObject", into = "VersionObject")]
pub struct NetworkVersion {
	pub major: u32,
	pub minor: u32,
	pub build: u32,
}

impl NetworkVersion {
	pub const fn new(major: u32, minor: u32, build: u32) -> Self {
		Self { major, minor, build }
	}
}

impl fmt::Display for NetworkVersion {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}.{}.{}", self.major, self.minor, self.build)
	}
}

#[derive(Serialize, Deserialize)]
struct VersionObject {
	major: u32,
	minor: u32,
	build: u32,
	#[serde(default = "version_class")]
	class: String,
}

fn version_class() -> String {
	"Version".to_string()
}

impl From<VersionObject> for NetworkVersion {
	fn from(raw: VersionObject) -> Self {
		Self::new(raw.major, raw.minor, raw.build)
	}
}

impl From<NetworkVersion> for VersionObject {
	fn from(version: NetworkVersion) -> Self {
		Self {
			major: version.major,
			minor: version.minor,
			build: version.build,
			class: version_class(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn serializes_with_class_marker() {
		let json = serde_json::to_value(NetworkVersion::new(0, 6, 1)).unwrap();
		assert_eq!(json["class"], "Version");
		assert_eq!(json["minor"], 6);
	}

	#[test]
	fn displays_dotted() {
		assert_eq!(NetworkVersion::new(0, 6, 1).to_string(), "0.6.1");
	}
}
