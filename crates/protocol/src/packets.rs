//! Client and server packets.
//!
//! Both directions use a `"cmd"` tag:
//!
//! ```text
//! [{"cmd": "Say", "text": "hello"}, {"cmd": "Sync"}]
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::data_package::DataPackageObject;
use crate::hints::HintCreationPolicy;
use crate::items::{ClientStatus, ItemsHandling, NetworkItem};
use crate::message::JsonMessagePart;
use crate::players::{NetworkPlayer, NetworkSlot};
use crate::version::NetworkVersion;

/// Packet sent from the client to the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cmd")]
pub enum ClientPacket {
	/// Login request for one slot.
	Connect(Connect),
	/// Changes tags or item handling of an established connection.
	ConnectUpdate {
		#[serde(skip_serializing_if = "Option::is_none")]
		items_handling: Option<ItemsHandling>,
		#[serde(skip_serializing_if = "Option::is_none")]
		tags: Option<Vec<String>>,
	},
	/// Requests a full resend of received items.
	Sync,
	LocationChecks {
		locations: Vec<i64>,
	},
	LocationScouts {
		locations: Vec<i64>,
		create_as_hint: HintCreationPolicy,
	},
	StatusUpdate {
		status: ClientStatus,
	},
	/// Chat message.
	Say {
		text: String,
	},
	GetDataPackage {
		#[serde(skip_serializing_if = "Option::is_none")]
		games: Option<Vec<String>>,
	},
	/// Relays `data` to every client matching the given filters.
	Bounce(Bounce),
	/// Reads keys from the server's data storage.
	Get {
		keys: Vec<String>,
	},
}

/// Payload of [`ClientPacket::Connect`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connect {
	pub password: Option<String>,
	pub game: String,
	pub name: String,
	pub uuid: String,
	pub version: NetworkVersion,
	pub items_handling: ItemsHandling,
	pub tags: Vec<String>,
	/// Asks the server to include slot data in `Connected`.
	pub slot_data: bool,
}

/// Payload of [`ClientPacket::Bounce`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Bounce {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub games: Option<Vec<String>>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub slots: Option<Vec<i64>>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub tags: Option<Vec<String>>,
	#[serde(default)]
	pub data: Map<String, Value>,
}

impl Bounce {
	/// Bounce addressed to every client carrying one of `tags`.
	pub fn to_tags(tags: Vec<String>, data: Map<String, Value>) -> Self {
		Self {
			tags: Some(tags),
			data,
			..Self::default()
		}
	}
}

/// Packet sent from the server to the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cmd")]
pub enum ServerPacket {
	RoomInfo(RoomInfo),
	ConnectionRefused {
		#[serde(default)]
		errors: Vec<String>,
	},
	Connected(Connected),
	ReceivedItems {
		index: u64,
		items: Vec<NetworkItem>,
	},
	/// Answer to `LocationScouts`.
	LocationInfo {
		locations: Vec<NetworkItem>,
	},
	RoomUpdate(RoomUpdate),
	#[serde(rename = "PrintJSON")]
	PrintJson(PrintJson),
	DataPackage {
		data: DataPackageObject,
	},
	Bounced(Bounced),
	InvalidPacket {
		#[serde(default, rename = "type")]
		kind: String,
		#[serde(default)]
		original_cmd: Option<String>,
		#[serde(default)]
		text: String,
	},
	/// Answer to `Get`.
	Retrieved {
		#[serde(default)]
		keys: Map<String, Value>,
	},
	SetReply {
		key: String,
		#[serde(default)]
		value: Value,
	},
	/// Any command this client does not know about.
	#[serde(other)]
	Unknown,
}

impl ServerPacket {
	/// Returns the `cmd` name of this packet.
	pub fn command(&self) -> &'static str {
		match self {
			ServerPacket::RoomInfo(_) => "RoomInfo",
			ServerPacket::ConnectionRefused { .. } => "ConnectionRefused",
			ServerPacket::Connected(_) => "Connected",
			ServerPacket::ReceivedItems { .. } => "ReceivedItems",
			ServerPacket::LocationInfo { .. } => "LocationInfo",
			ServerPacket::RoomUpdate(_) => "RoomUpdate",
			ServerPacket::PrintJson(_) => "PrintJSON",
			ServerPacket::DataPackage { .. } => "DataPackage",
			ServerPacket::Bounced(_) => "Bounced",
			ServerPacket::InvalidPacket { .. } => "InvalidPacket",
			ServerPacket::Retrieved { .. } => "Retrieved",
			ServerPacket::SetReply { .. } => "SetReply",
			ServerPacket::Unknown => "Unknown",
		}
	}
}

/// First packet sent by the server after the socket opens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomInfo {
	pub version: NetworkVersion,
	#[serde(default)]
	pub generator_version: Option<NetworkVersion>,
	#[serde(default)]
	pub tags: Vec<String>,
	#[serde(default)]
	pub password: bool,
	#[serde(default)]
	pub hint_cost: i64,
	#[serde(default)]
	pub location_check_points: i64,
	#[serde(default)]
	pub games: Vec<String>,
	#[serde(default)]
	pub datapackage_checksums: HashMap<String, String>,
	#[serde(default)]
	pub seed_name: String,
	#[serde(default)]
	pub time: f64,
}

/// Successful login reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connected {
	pub team: i64,
	pub slot: i64,
	#[serde(default)]
	pub players: Vec<NetworkPlayer>,
	#[serde(default)]
	pub missing_locations: Vec<i64>,
	#[serde(default)]
	pub checked_locations: Vec<i64>,
	#[serde(default)]
	pub slot_data: Value,
	/// Keyed by the slot number rendered as a string.
	#[serde(default)]
	pub slot_info: HashMap<String, NetworkSlot>,
	#[serde(default)]
	pub hint_points: i64,
}

/// Incremental room changes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoomUpdate {
	#[serde(default)]
	pub players: Option<Vec<NetworkPlayer>>,
	#[serde(default)]
	pub checked_locations: Option<Vec<i64>>,
	#[serde(default)]
	pub missing_locations: Option<Vec<i64>>,
	#[serde(default)]
	pub hint_points: Option<i64>,
	#[serde(default)]
	pub tags: Option<Vec<String>>,
}

/// Server-formatted log message.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PrintJson {
	#[serde(default)]
	pub data: Vec<JsonMessagePart>,
	#[serde(default, rename = "type")]
	pub kind: Option<String>,
	#[serde(default)]
	pub receiving: Option<i64>,
	#[serde(default)]
	pub item: Option<NetworkItem>,
	#[serde(default)]
	pub slot: Option<i64>,
	#[serde(default)]
	pub message: Option<String>,
}

/// A relayed [`Bounce`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Bounced {
	#[serde(default)]
	pub games: Option<Vec<String>>,
	#[serde(default)]
	pub slots: Option<Vec<i64>>,
	#[serde(default)]
	pub tags: Option<Vec<String>>,
	#[serde(default)]
	pub data: Map<String, Value>,
}

impl Bounced {
	pub fn has_tag(&self, tag: &str) -> bool {
		self.tags.as_ref().is_some_and(|tags| tags.iter().any(|t| t == tag))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::items::ItemFlags;

	#[test]
	fn sync_serializes_to_bare_command() {
		let json = serde_json::to_value(ClientPacket::Sync).unwrap();
		assert_eq!(json, serde_json::json!({"cmd": "Sync"}));
	}

	#[test]
	fn location_scouts_carries_numeric_policy() {
		let packet = ClientPacket::LocationScouts {
			locations: vec![1, 2],
			create_as_hint: HintCreationPolicy::CreateAndAnnounceOnce,
		};
		let json = serde_json::to_value(packet).unwrap();
		assert_eq!(json["cmd"], "LocationScouts");
		assert_eq!(json["create_as_hint"], 2);
		assert_eq!(json["locations"], serde_json::json!([1, 2]));
	}

	#[test]
	fn connect_serializes_version_and_tags() {
		let packet = ClientPacket::Connect(Connect {
			password: None,
			game: "Stardew Valley".into(),
			name: "Farmer".into(),
			uuid: "abc".into(),
			version: NetworkVersion::new(0, 6, 1),
			items_handling: ItemsHandling::ALL,
			tags: vec!["AP".into(), "DeathLink".into()],
			slot_data: true,
		});
		let json = serde_json::to_value(packet).unwrap();
		assert_eq!(json["cmd"], "Connect");
		assert_eq!(json["items_handling"], 7);
		assert_eq!(json["version"]["class"], "Version");
		assert_eq!(json["tags"][1], "DeathLink");
	}

	#[test]
	fn connected_parses_players_and_slot_info() {
		let json = r#"{
			"cmd": "Connected",
			"team": 0,
			"slot": 2,
			"players": [{"team": 0, "slot": 1, "alias": "Al", "name": "Alice", "class": "NetworkPlayer"}],
			"missing_locations": [10, 11],
			"checked_locations": [12],
			"slot_data": {"multiworld_version": "1.2.0"},
			"slot_info": {"1": {"name": "Alice", "game": "Hollow Knight", "type": 1, "group_members": []}},
			"hint_points": 3
		}"#;
		let packet: ServerPacket = serde_json::from_str(json).unwrap();
		let ServerPacket::Connected(connected) = packet else {
			panic!("Expected Connected");
		};
		assert_eq!(connected.slot, 2);
		assert_eq!(connected.players[0].alias, "Al");
		assert_eq!(connected.slot_info["1"].game, "Hollow Knight");
		assert_eq!(connected.slot_data["multiworld_version"], "1.2.0");
	}

	#[test]
	fn unknown_command_is_tolerated() {
		let packet: ServerPacket =
			serde_json::from_str(r#"{"cmd": "SomethingNew", "payload": 1}"#).unwrap();
		assert_eq!(packet, ServerPacket::Unknown);
	}

	#[test]
	fn print_json_keeps_typed_parts() {
		let json = r#"{
			"cmd": "PrintJSON",
			"type": "ItemSend",
			"data": [
				{"type": "player_id", "text": "1"},
				{"text": " found their "},
				{"type": "item_id", "text": "77", "player": 1, "flags": 1}
			]
		}"#;
		let packet: ServerPacket = serde_json::from_str(json).unwrap();
		let ServerPacket::PrintJson(print) = packet else {
			panic!("Expected PrintJSON");
		};
		assert_eq!(print.kind.as_deref(), Some("ItemSend"));
		assert_eq!(print.data[2].flags, Some(ItemFlags::ADVANCEMENT));
	}

	#[test]
	fn bounced_tag_lookup() {
		let bounced = Bounced {
			tags: Some(vec!["DeathLink".into()]),
			..Bounced::default()
		};
		assert!(bounced.has_tag("DeathLink"));
		assert!(!bounced.has_tag("MoveLink"));
	}
}
