//! Chat room broadcast properties under concurrent posting.

use std::sync::Arc;
use std::time::Duration;

use teletel_server::{ChatMessage, ChatRegistration, ChatRoom};

/// Drain `registration` until `count` messages arrived or two seconds pass.
async fn drain_until(registration: &ChatRegistration, count: usize) -> Vec<ChatMessage> {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    let mut collected = Vec::new();
    while collected.len() < count && tokio::time::Instant::now() < deadline {
        collected.extend(registration.drain());
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    collected
}

#[tokio::test]
async fn concurrent_posters_share_one_global_order() {
    let room = ChatRoom::new();
    let left = room.register();
    let right = room.register();

    // 16 lines total stays under the mailbox depth, so nothing is trimmed
    // before the consumers drain.
    let producers = 4u32;
    let lines = 4u32;

    let mut tasks = tokio::task::JoinSet::new();
    for producer in 0..producers {
        let room = Arc::clone(&room);
        tasks.spawn(async move {
            for turn in 0..lines {
                room.post(ChatMessage {
                    author: format!("p{producer}"),
                    body: format!("{turn}"),
                });
                tokio::task::yield_now().await;
            }
        });
    }
    while let Some(joined) = tasks.join_next().await {
        joined.unwrap();
    }

    let total = (producers * lines) as usize;
    let seen_left = drain_until(&left, total).await;
    let seen_right = drain_until(&right, total).await;

    assert_eq!(seen_left.len(), total);
    // Every client observes the same interleaving, whatever it turned out
    // to be.
    assert_eq!(seen_left, seen_right);

    // And within that interleaving each producer's lines stay in posting
    // order.
    for producer in 0..producers {
        let author = format!("p{producer}");
        let bodies: Vec<&str> = seen_left
            .iter()
            .filter(|message| message.author == author)
            .map(|message| message.body.as_str())
            .collect();
        let expected: Vec<String> = (0..lines).map(|turn| turn.to_string()).collect();
        assert_eq!(bodies, expected);
    }
}

#[tokio::test]
async fn room_lives_as_long_as_any_registration() {
    let room = ChatRoom::new();
    let member = room.register();
    drop(room);

    member.post("solo", "toujours la");
    let seen = drain_until(&member, 1).await;
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].author, "solo");
    assert_eq!(seen[0].body, "toujours la");
}
