//! End-to-end notification flows: reconciliation, wire delivery, and the
//! client badge reducer, using the same frames the event bridge emits.

use chrono::Utc;
use uuid::Uuid;

use recipehub_entity::comment::{Comment, CommentView};
use recipehub_entity::notification::NotificationKind;
use recipehub_entity::user::UserBrief;
use recipehub_realtime::badge::BadgeSynchronizer;
use recipehub_realtime::message::{RecipeRef, ServerMessage};
use recipehub_realtime::room::RoomId;

use super::helpers::{build_stack, connect_user, parse_frame};

#[tokio::test]
async fn test_like_notifies_owner_and_updates_badge() {
    let stack = build_stack();
    let engine = &stack.state.realtime_engine;
    let owner = stack.store.add_user("owner");
    let liker = stack.store.add_user("liker");
    let recipe = stack.store.add_recipe(owner, "Shakshuka");

    let (_handle, mut rx) = connect_user(&stack, owner);
    let mut badge = BadgeSynchronizer::new(owner);

    let delivery = stack
        .reconciler
        .like_applied(recipe, liker)
        .await
        .unwrap()
        .expect("first like should notify");
    let message = ServerMessage::new_notification(
        &delivery.notification,
        delivery.sender.clone(),
        Some(RecipeRef::from(&delivery.recipe)),
    );
    engine.fanout.broadcast(&RoomId::user(owner), &message).await;
    engine
        .fanout
        .push_unread_count(owner, delivery.unread_count)
        .await;

    let first = parse_frame(&rx.try_recv().unwrap());
    assert!(matches!(
        first,
        ServerMessage::NewNotification { recipient_id, .. } if recipient_id == owner
    ));
    badge.apply(&first);
    assert_eq!(badge.count(), 1);

    let second = parse_frame(&rx.try_recv().unwrap());
    badge.apply(&second);
    assert_eq!(badge.count(), stack.store.unread(owner));
    assert_eq!(
        stack
            .store
            .rows_matching(owner, liker, recipe, NotificationKind::Like),
        1
    );
}

#[tokio::test]
async fn test_unlike_removes_notification_and_badge_returns_to_zero() {
    let stack = build_stack();
    let engine = &stack.state.realtime_engine;
    let owner = stack.store.add_user("owner");
    let liker = stack.store.add_user("liker");
    let recipe = stack.store.add_recipe(owner, "Shakshuka");

    let (_handle, mut rx) = connect_user(&stack, owner);
    let mut badge = BadgeSynchronizer::new(owner);

    let delivery = stack
        .reconciler
        .like_applied(recipe, liker)
        .await
        .unwrap()
        .unwrap();
    let message = ServerMessage::new_notification(&delivery.notification, delivery.sender, None);
    engine.fanout.broadcast(&RoomId::user(owner), &message).await;

    let removal = stack
        .reconciler
        .like_removed(recipe, liker)
        .await
        .unwrap()
        .expect("unlike should remove the stored notification");
    let removed = ServerMessage::NotificationRemoved {
        kind: removal.kind,
        recipe_id: removal.recipe_id,
        sender_id: removal.sender_id,
        recipient_id: Some(removal.recipient_id),
    };
    engine.fanout.broadcast(&RoomId::user(owner), &removed).await;
    engine
        .fanout
        .push_unread_count(owner, removal.unread_count)
        .await;

    while let Ok(frame) = rx.try_recv() {
        badge.apply(&parse_frame(&frame));
    }

    assert_eq!(badge.count(), 0);
    assert_eq!(stack.store.unread(owner), 0);
    assert_eq!(
        stack
            .store
            .rows_matching(owner, liker, recipe, NotificationKind::Like),
        0
    );
}

#[tokio::test]
async fn test_badge_converges_after_authoritative_refresh() {
    let stack = build_stack();
    let owner = stack.store.add_user("owner");
    let liker_a = stack.store.add_user("liker-a");
    let liker_b = stack.store.add_user("liker-b");
    let recipe_a = stack.store.add_recipe(owner, "Shakshuka");
    let recipe_b = stack.store.add_recipe(owner, "Focaccia");

    let mut badge = BadgeSynchronizer::new(owner);

    let first = stack
        .reconciler
        .like_applied(recipe_a, liker_a)
        .await
        .unwrap()
        .unwrap();
    // The second delivery's frame never reaches this client; the local
    // count drifts below server truth.
    stack
        .reconciler
        .like_applied(recipe_b, liker_b)
        .await
        .unwrap()
        .unwrap();

    badge.apply(&ServerMessage::new_notification(
        &first.notification,
        first.sender,
        None,
    ));
    assert_eq!(badge.count(), 1);
    assert_eq!(stack.store.unread(owner), 2);

    badge.refresh(stack.store.unread(owner));
    assert_eq!(badge.count(), stack.store.unread(owner));
}

#[tokio::test]
async fn test_own_comment_fans_out_without_notification() {
    let stack = build_stack();
    let engine = &stack.state.realtime_engine;
    let owner = stack.store.add_user("owner");
    let recipe = stack.store.add_recipe(owner, "Shakshuka");

    let (handle, mut rx) = connect_user(&stack, owner);
    engine.rooms.join(&RoomId::recipe(recipe), handle.id);

    assert!(
        stack
            .reconciler
            .comment_posted(recipe, owner)
            .await
            .unwrap()
            .is_none()
    );

    let comment = CommentView::from_parts(
        Comment {
            id: Uuid::new_v4(),
            recipe_id: recipe,
            author_id: owner,
            body: "Turned out great".to_string(),
            created_at: Utc::now(),
        },
        UserBrief {
            id: owner,
            username: "owner".to_string(),
            display_name: None,
            avatar_url: None,
        },
    );
    engine
        .fanout
        .broadcast(
            &RoomId::recipe(recipe),
            &ServerMessage::CommentAdded { comment },
        )
        .await;

    assert!(matches!(
        parse_frame(&rx.try_recv().unwrap()),
        ServerMessage::CommentAdded { .. }
    ));
    assert!(rx.try_recv().is_err());
    assert_eq!(stack.store.unread(owner), 0);
}
