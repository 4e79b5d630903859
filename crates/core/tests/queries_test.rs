// Player, location, item and hint queries.

mod mock_session;

use std::time::Duration;

use ap::{Hint, HintStatus, ItemFlags, NetworkItem, ServerPacket};
use ap_runtime::Session;
use mock_session::{MockConnector, OTHER_GAME, client, info};

fn hint(finding_player: i64, location: i64, found: bool, status: HintStatus) -> Hint {
	Hint {
		receiving_player: 2,
		finding_player,
		location,
		item: 500,
		found,
		entrance: String::new(),
		item_flags: ItemFlags::ADVANCEMENT,
		status,
	}
}

#[tokio::test]
async fn test_player_queries() {
	let connector = MockConnector::accepting();
	let client = client(&connector);
	assert!(client.connect(info()).await.is_success());

	assert_eq!(client.team().await, Some(0));
	assert_eq!(client.player_name(2).await, "Knight");
	assert_eq!(client.player_name(99).await, "Archipelago Player");
	assert_eq!(client.current_player_name().await, "Farmer");
	assert_eq!(client.current_player().await.map(|p| p.slot), Some(1));
	assert!(client.player_exists("Knight").await);
	assert!(!client.player_exists("Nobody").await);
	assert_eq!(client.player_game("Knight").await.as_deref(), Some(OTHER_GAME));
	assert_eq!(client.player_game_by_slot(2).await.as_deref(), Some(OTHER_GAME));
	assert!(client.is_current_game_player("Farmer").await);
	assert!(!client.is_current_game_player("Knight").await);
	assert_eq!(client.all_players().await.len(), 2);
	assert_eq!(client.player_alias("Knight").await, None);
}

#[tokio::test]
async fn test_queries_default_when_disconnected() {
	let connector = MockConnector::accepting();
	let client = client(&connector);

	assert_eq!(client.team().await, None);
	assert_eq!(client.player_name(1).await, "Archipelago Player");
	assert!(client.all_players().await.is_empty());
	assert!(client.all_locations().await.is_empty());
	assert!(client.all_received_items().await.is_empty());
	assert!(client.hints().await.is_empty());
	assert!(!client.location_exists("Farm Cave").await);
	assert_eq!(connector.attempts(), 0);
}

#[tokio::test]
async fn test_location_queries() {
	let connector = MockConnector::accepting();
	let client = client(&connector);
	assert!(client.connect(info()).await.is_success());

	let checked = client.all_checked_locations().await;
	assert_eq!(checked.get("Community Center"), Some(&13));
	assert_eq!(checked.len(), 1);

	assert_eq!(client.all_missing_locations().await, vec![10, 11, 12]);
	assert_eq!(client.all_locations().await.len(), 4);

	let mut names = client.all_missing_location_names().await;
	names.sort();
	assert_eq!(names, vec!["Farm Cave", "Mines Floor 10", "Mines Floor 5"]);

	assert!(client.location_exists("Farm Cave").await);
	assert!(client.location_exists("Community Center").await);
	assert!(!client.location_exists("King's Pass").await);
}

#[tokio::test]
async fn test_received_item_queries() {
	let connector = MockConnector::accepting();
	let client = client(&connector);
	assert!(client.connect(info()).await.is_success());

	let item = |item, location, player| NetworkItem {
		item,
		location,
		player,
		flags: ItemFlags::NONE,
	};
	connector
		.last_session()
		.room()
		.write()
		.apply(&ServerPacket::ReceivedItems {
			index: 0,
			items: vec![item(1, 900, 2), item(2, 10, 1), item(1, 11, 1)],
		});

	let received = client.all_received_items().await;
	assert_eq!(received.len(), 3);
	assert_eq!(received[0].item_name, "Hoe");
	assert_eq!(received[0].location_name, "King's Pass");
	assert_eq!(received[0].player_name, "Knight");
	assert_eq!(received[2].index, 2);

	assert_eq!(client.received_item_count("Hoe").await, 2);
	assert_eq!(client.received_item_counts().await.get("Pickaxe"), Some(&1));
	assert_eq!(client.has_received_item("hoe", true).await.as_deref(), Some("Knight"));
	assert_eq!(client.has_received_item("hoe", false).await, None);
}

#[tokio::test]
async fn test_active_hint_filters() {
	let connector = MockConnector::accepting();
	connector.set_hints(vec![
		hint(1, 10, false, HintStatus::Priority),
		hint(1, 11, false, HintStatus::Avoid),
		hint(1, 12, true, HintStatus::Found),
		hint(2, 900, false, HintStatus::Priority),
	]);
	let client = client(&connector);
	assert!(client.connect(info()).await.is_success());

	assert_eq!(client.hints().await.len(), 4);
	assert_eq!(client.my_active_hints().await.len(), 2);

	let desired = client.my_active_desired_hints().await;
	assert_eq!(desired.len(), 1);
	assert_eq!(client.hint_location_name(&desired[0]), "Farm Cave");

	let avoided = client.my_active_avoided_hints().await;
	assert_eq!(avoided[0].location, 11);

	let other = client.hints().await.pop().expect("hint");
	assert_eq!(client.hint_location_name(&other), "King's Pass");
	assert!(client.ensure_usable_within(Duration::ZERO).await);
}
