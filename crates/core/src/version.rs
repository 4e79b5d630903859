//! Mod/multiworld version compatibility.
//!
//! Versions are dotted `major.minor.fix` strings. The multiworld states the
//! version it was generated for; a mod is compatible when the majors match
//! and its minor is at least the required one. A required minor of `x` or
//! `0` accepts any minor.

use thiserror::Error;

use crate::result::ConnectionResult;

/// Why a mod version does not fit a multiworld.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VersionMismatch {
	#[error("{0}")]
	Malformed(String),
	#[error("mod version is older than required")]
	Outdated,
	#[error("mod version is newer than supported")]
	TooNew,
}

impl VersionMismatch {
	/// Builds the user-facing result for this mismatch.
	pub fn into_result(self, mod_name: &str, mod_version: &str, required: &str) -> ConnectionResult {
		match self {
			VersionMismatch::Malformed(details) => ConnectionResult::VersionMalformed { details },
			VersionMismatch::Outdated => ConnectionResult::ClientOutdated {
				mod_name: mod_name.to_string(),
				mod_version: mod_version.to_string(),
				required: required.to_string(),
			},
			VersionMismatch::TooNew => ConnectionResult::ClientTooNew {
				mod_name: mod_name.to_string(),
				mod_version: mod_version.to_string(),
				required: required.to_string(),
			},
		}
	}
}

/// Checks `mod_version` against the multiworld's `required` version.
pub fn check_compatibility(mod_version: &str, required: &str) -> Result<(), VersionMismatch> {
	let required_parts: Vec<&str> = required.split('.').collect();
	if required_parts.len() < 3 {
		return Err(VersionMismatch::Malformed(format!(
			"multiworld version '{required}' does not have three components"
		)));
	}
	let mod_parts: Vec<&str> = mod_version.split('.').collect();
	if mod_parts.len() < 3 {
		return Err(VersionMismatch::Malformed(format!(
			"mod version '{mod_version}' does not have three components"
		)));
	}

	let mod_major = parse_component(mod_parts[0], mod_version)?;
	let required_major = parse_component(required_parts[0], required)?;
	if mod_major > required_major {
		return Err(VersionMismatch::TooNew);
	}
	if mod_major < required_major {
		return Err(VersionMismatch::Outdated);
	}

	let required_minor = required_parts[1];
	if required_minor.eq_ignore_ascii_case("x") || required_minor == "0" {
		return Ok(());
	}

	let required_minor = parse_component(required_minor, required)?;
	let mod_minor = parse_component(mod_parts[1], mod_version)?;
	if mod_minor < required_minor {
		return Err(VersionMismatch::Outdated);
	}
	Ok(())
}

fn parse_component(component: &str, version: &str) -> Result<u64, VersionMismatch> {
	component.trim().parse().map_err(|_| {
		VersionMismatch::Malformed(format!("'{component}' in version '{version}' is not a number"))
	})
}
