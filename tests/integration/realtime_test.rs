//! Connection lifecycle, room membership, and fan-out behavior.

use uuid::Uuid;

use recipehub_realtime::message::ServerMessage;
use recipehub_realtime::room::RoomId;

use super::helpers::{build_stack, connect_user, parse_frame};

fn join_recipe_frame(recipe_id: Uuid) -> String {
    format!(r#"{{"event":"join-recipe-room","data":{{"recipeId":"{recipe_id}"}}}}"#)
}

fn leave_recipe_frame(recipe_id: Uuid) -> String {
    format!(r#"{{"event":"leave-recipe-room","data":{{"recipeId":"{recipe_id}"}}}}"#)
}

#[tokio::test]
async fn test_disconnect_cleans_every_membership() {
    let stack = build_stack();
    let engine = &stack.state.realtime_engine;
    let (handle, mut rx) = connect_user(&stack, Uuid::new_v4());

    for recipe_id in [Uuid::new_v4(), Uuid::new_v4()] {
        engine
            .connections
            .handle_inbound(&handle.id, &join_recipe_frame(recipe_id))
            .await;
        assert!(matches!(
            parse_frame(&rx.try_recv().unwrap()),
            ServerMessage::RoomJoined { .. }
        ));
    }
    // Personal room (auto-joined at registration) plus the two recipe rooms.
    assert_eq!(engine.rooms.membership_count(handle.id), 3);

    engine.connections.unregister(&handle.id);

    assert_eq!(engine.rooms.membership_count(handle.id), 0);
    assert_eq!(engine.rooms.room_count(), 0);
    assert_eq!(engine.connections.connection_count(), 0);
}

#[tokio::test]
async fn test_join_foreign_user_room_refused() {
    let stack = build_stack();
    let engine = &stack.state.realtime_engine;
    let (handle, mut rx) = connect_user(&stack, Uuid::new_v4());
    let other = Uuid::new_v4();

    let frame = format!(r#"{{"event":"join-user-room","data":{{"userId":"{other}"}}}}"#);
    engine.connections.handle_inbound(&handle.id, &frame).await;

    match parse_frame(&rx.try_recv().unwrap()) {
        ServerMessage::Error { code, .. } => assert_eq!(code, "FORBIDDEN"),
        unexpected => panic!("expected error frame, got {unexpected:?}"),
    }
    assert!(!engine.rooms.is_member(&RoomId::user(other), handle.id));
}

#[tokio::test]
async fn test_recipe_broadcast_reaches_only_current_members() {
    let stack = build_stack();
    let engine = &stack.state.realtime_engine;
    let recipe_id = Uuid::new_v4();

    let (member, mut member_rx) = connect_user(&stack, Uuid::new_v4());
    let (leaver, mut leaver_rx) = connect_user(&stack, Uuid::new_v4());
    let (_outsider, mut outsider_rx) = connect_user(&stack, Uuid::new_v4());

    for conn in [&member, &leaver] {
        engine
            .connections
            .handle_inbound(&conn.id, &join_recipe_frame(recipe_id))
            .await;
    }
    member_rx.try_recv().unwrap();
    leaver_rx.try_recv().unwrap();

    engine
        .connections
        .handle_inbound(&leaver.id, &leave_recipe_frame(recipe_id))
        .await;
    assert!(matches!(
        parse_frame(&leaver_rx.try_recv().unwrap()),
        ServerMessage::RoomLeft { .. }
    ));

    engine
        .fanout
        .broadcast(
            &RoomId::recipe(recipe_id),
            &ServerMessage::RatingUpdated {
                recipe_id,
                average_rating: 4.5,
                total_ratings: 2,
            },
        )
        .await;

    assert!(matches!(
        parse_frame(&member_rx.try_recv().unwrap()),
        ServerMessage::RatingUpdated { .. }
    ));
    assert!(leaver_rx.try_recv().is_err());
    assert!(outsider_rx.try_recv().is_err());
}

#[tokio::test]
async fn test_connection_cap_evicts_oldest() {
    let stack = build_stack();
    let engine = &stack.state.realtime_engine;
    let user_id = Uuid::new_v4();
    let max = stack.state.config.realtime.max_connections_per_user;

    let mut connections = Vec::new();
    for _ in 0..max {
        connections.push(connect_user(&stack, user_id));
    }
    let oldest_id = connections[0].0.id;

    let _extra = connect_user(&stack, user_id);

    assert_eq!(engine.connections.connection_count(), max);
    assert!(engine.connections.is_user_connected(&user_id));
    assert!(!connections[0].0.is_alive());
    assert_eq!(engine.rooms.membership_count(oldest_id), 0);
}

#[tokio::test]
async fn test_spoofed_actor_id_rejected() {
    let stack = build_stack();
    let engine = &stack.state.realtime_engine;
    let (handle, mut rx) = connect_user(&stack, Uuid::new_v4());

    let recipe_id = Uuid::new_v4();
    let claimed = Uuid::new_v4();
    let frame = format!(
        r#"{{"event":"like-recipe","data":{{"recipeId":"{recipe_id}","userId":"{claimed}","isLiked":true}}}}"#
    );
    engine.connections.handle_inbound(&handle.id, &frame).await;

    match parse_frame(&rx.try_recv().unwrap()) {
        ServerMessage::Error { code, .. } => assert_eq!(code, "IDENTITY_MISMATCH"),
        unexpected => panic!("expected error frame, got {unexpected:?}"),
    }
}

#[tokio::test]
async fn test_malformed_frame_gets_error_reply() {
    let stack = build_stack();
    let engine = &stack.state.realtime_engine;
    let (handle, mut rx) = connect_user(&stack, Uuid::new_v4());

    engine
        .connections
        .handle_inbound(&handle.id, "{not json at all")
        .await;

    match parse_frame(&rx.try_recv().unwrap()) {
        ServerMessage::Error { code, .. } => assert_eq!(code, "INVALID_MESSAGE"),
        unexpected => panic!("expected error frame, got {unexpected:?}"),
    }
}
