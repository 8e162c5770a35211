//! Page-only sessions: every fact arrives through the pollers.

mod common;

use kkutu_core::logging::test_utils::capture_logs;
use kkutu_core::{GameMode, LifecycleEvent, TurnErrorCode};
use kkutu_sync::GameSession;

use common::{FakePage, Recorder, fast_context, ids, run_for};

/// Session on a page where I am seated second of two in a chain game.
async fn seated_session() -> (GameSession, std::sync::Arc<FakePage>, Recorder) {
    let page = FakePage::new();
    page.update(|f| {
        f.user_id = Some("me".into());
        f.game_sequence = ids(&["a", "me"]);
        f.game_mode = GameMode::LastAndFirst;
        f.round_index = 1;
    });
    let session = GameSession::new(fast_context(), page.clone());
    let recorder = Recorder::attach(session.bus());
    assert!(session.start());
    run_for(500).await;
    (session, page, recorder)
}

#[tokio::test(start_paused = true)]
async fn detects_identity_roster_mode_and_round() {
    let (session, page, recorder) = seated_session().await;

    assert_eq!(recorder.count("session_changed"), 1);
    assert_eq!(recorder.count("game_started"), 1);
    assert_eq!(recorder.count("game_mode_changed"), 1);
    assert_eq!(recorder.count("round_changed"), 1);
    assert!(page.helper_registrations() > 0);

    page.update(|f| f.game_sequence.clear());
    run_for(300).await;
    assert_eq!(recorder.count("game_ended"), 1);
    assert!(!session.synchronizer().am_i_gaming());

    session.stop().await;
}

#[tokio::test(start_paused = true)]
async fn turns_follow_the_highlighted_seat() {
    let (session, page, recorder) = seated_session().await;

    page.update(|f| {
        f.turn_seat = Some(0);
        f.presented_word = "가".into();
    });
    run_for(300).await;

    page.update(|f| {
        f.turn_seat = Some(1);
        f.is_my_turn = true;
        f.presented_word = "나".into();
    });
    run_for(300).await;

    page.update(|f| {
        f.turn_seat = Some(0);
        f.is_my_turn = false;
        f.presented_word = "다".into();
    });
    run_for(300).await;
    session.stop().await;

    let starts: Vec<(i64, bool, String)> = recorder
        .of_type("turn_started")
        .into_iter()
        .map(|e| match e {
            LifecycleEvent::TurnStarted {
                turn_index,
                is_my_turn,
                condition,
                ..
            } => (turn_index, is_my_turn, condition.char),
            other => panic!("unexpected {other:?}"),
        })
        .collect();
    assert_eq!(
        starts,
        vec![
            (0, false, "가".to_owned()),
            (1, true, "나".to_owned()),
            (2, false, "다".to_owned()),
        ]
    );
    assert_eq!(recorder.count("turn_ended"), 1);
}

#[tokio::test(start_paused = true)]
async fn whole_previous_word_yields_chain_node() {
    let (session, page, recorder) = seated_session().await;
    page.update(|f| {
        f.turn_seat = Some(0);
        f.presented_word = "사과".into();
    });
    run_for(300).await;
    session.stop().await;

    match recorder.of_type("turn_started").first() {
        Some(LifecycleEvent::TurnStarted { condition, .. }) => assert_eq!(condition.char, "과"),
        other => panic!("unexpected {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn word_facts_are_deduplicated() {
    let (session, page, recorder) = seated_session().await;

    page.update(|f| {
        f.word_histories = vec!["사과".into(), "과자".into()];
        f.unsupported_word = Some("한방 단어: 늪".into());
        f.example_word = Some("게임 끝".into());
    });
    run_for(300).await;
    page.update(|f| {
        f.word_histories = vec!["자두".into(), "사과".into(), "과자".into()];
        f.example_word = Some("가방".into());
    });
    run_for(300).await;
    session.stop().await;

    assert_eq!(recorder.count("word_history_discovered"), 3);
    assert_eq!(recorder.count("hint_word_presented"), 1);
    match recorder.of_type("unsupported_word_entered").as_slice() {
        [LifecycleEvent::UnsupportedWordEntered {
            word,
            code,
            is_end_word,
            ..
        }] => {
            assert_eq!(word, "늪");
            assert_eq!(*code, TurnErrorCode::EndWord);
            assert!(*is_end_word);
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn typing_battle_word_from_page() {
    let (session, page, recorder) = seated_session().await;
    page.update(|f| {
        f.game_mode = GameMode::TypingBattle;
        f.is_my_turn = true;
        f.typing_word = Some("사과 apple".into());
    });
    run_for(500).await;
    session.stop().await;

    match recorder.of_type("typing_word_presented").as_slice() {
        [LifecycleEvent::TypingWordPresented { word, .. }] => assert_eq!(word, "사과"),
        other => panic!("unexpected {other:?}"),
    }
    assert_eq!(recorder.count("turn_started"), 0);
}

#[tokio::test(start_paused = true)]
async fn transient_failures_are_absorbed() {
    let page = FakePage::new();
    page.set_blind(true);
    let session = GameSession::new(fast_context(), page.clone());
    let recorder = Recorder::attach(session.bus());
    assert!(session.start());
    run_for(500).await;
    assert!(recorder.events().is_empty());

    page.set_blind(false);
    page.update(|f| {
        f.user_id = Some("me".into());
        f.game_sequence = ids(&["me"]);
    });
    run_for(300).await;
    assert_eq!(recorder.count("game_started"), 1);
    session.stop().await;
}

#[tokio::test(start_paused = true)]
async fn disconnected_page_faults_active_pollers() {
    let (logs, _guard) = capture_logs();
    let (session, page, recorder) = seated_session().await;
    recorder.clear();

    page.disconnect();
    run_for(500).await;
    assert!(logs.has_event(tracing::Level::ERROR, "poller faulted"));
    assert!(logs.has_field("poller", "game_progress"));
    assert!(logs.has_field("poller", "game_mode"));

    session.stop().await;
    assert!(recorder.events().is_empty());
    assert!(!session.is_running());
}

#[tokio::test(start_paused = true)]
async fn only_leading_game_over_text_hides_hint() {
    let (session, page, recorder) = seated_session().await;

    page.update(|f| f.example_word = Some("게임 끝! 수고하셨습니다".into()));
    run_for(300).await;
    page.update(|f| f.example_word = Some("오늘의 게임 끝말".into()));
    run_for(300).await;
    session.stop().await;

    match recorder.of_type("hint_word_presented").as_slice() {
        [LifecycleEvent::HintWordPresented { word, .. }] => assert_eq!(word, "오늘의 게임 끝말"),
        other => panic!("unexpected {other:?}"),
    }
}
