//! Rich text fragments carried by `PrintJSON`.

use serde::{Deserialize, Serialize};

use crate::items::ItemFlags;

/// One fragment of a `PrintJSON` message.
///
/// `kind` tells how `text` is meant to be read: `"player_id"`, `"item_id"` and
/// `"location_id"` carry numeric ids as text, to be resolved by the client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonMessagePart {
	#[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
	pub kind: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub text: Option<String>,
	/// Slot whose game the id belongs to, for item/location parts.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub player: Option<i64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub flags: Option<ItemFlags>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub color: Option<String>,
}

impl JsonMessagePart {
	pub fn text(text: impl Into<String>) -> Self {
		Self {
			text: Some(text.into()),
			..Self::default()
		}
	}
}
