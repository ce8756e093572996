use circle_pop::app::App;
use circle_pop::core::pieces::find_shape;
use circle_pop::core::{DropOutcome, GameState, Hand, Phase, Piece};
use circle_pop::scores::ScoreStore;
use circle_pop::types::{CellState, GameEvent, GameMode, PlayerAction, PALETTE};

fn piece(matrix: &[&[u8]], color: usize) -> Piece {
    Piece::new(find_shape(matrix).unwrap(), PALETTE[color])
}

fn game_with_hand(mode: GameMode, slots: Vec<Option<Piece>>) -> GameState {
    let mut game = GameState::new(mode, 2468);
    game.board_mut().clear();
    *game.hand_mut() = Hand::from_slots(slots);
    game
}

fn drop_at(game: &mut GameState, slot: usize, origin: (i8, i8)) -> DropOutcome {
    game.begin_drag(slot).unwrap();
    assert!(game.update_hover(origin.0, origin.1));
    game.resolve_drop(None)
}

#[test]
fn test_two_bars_complete_a_row() {
    let bar = |c| piece(&[&[1, 1, 1, 1]], c);
    let mut game = game_with_hand(
        GameMode::Classic,
        vec![Some(bar(0)), Some(bar(1)), Some(bar(2))],
    );

    let DropOutcome::Placed(first) = drop_at(&mut game, 0, (0, 0)) else {
        panic!("first bar should place");
    };
    assert_eq!(first.points(), 4);
    assert_eq!(first.lines_broken, 0);
    assert_eq!(game.no_break_streak(), 1);

    // Hovering the second bar previews the row clear.
    game.begin_drag(1).unwrap();
    game.update_hover(4, 0);
    let snap = game.snapshot();
    assert_eq!(snap.drag.as_ref().unwrap().preview_lines, 1);
    assert_eq!(snap.cell(0, 0).unwrap().state, CellState::HoveredBreakFilled);

    let DropOutcome::Placed(second) = game.resolve_drop(None) else {
        panic!("second bar should place");
    };
    assert_eq!(second.origin, (4, 0));
    assert_eq!(second.lines_broken, 1);
    // 4 + 1 * 8 * (1 / 2) * 4
    assert_eq!(second.points(), 20);
    assert_eq!(game.score(), 24);
    assert_eq!(game.combo(), 1);
    assert_eq!(game.no_break_streak(), 0);
    for x in 0..8 {
        assert_eq!(game.board().state(x, 0), Some(CellState::Empty));
    }
    assert_eq!(game.hand().remaining(), 1);
}

#[test]
fn test_combo_decays_after_a_hand_of_quiet_drops() {
    let bar = |c| piece(&[&[1, 1, 1, 1]], c);
    let dot = |c| piece(&[&[1, 1]], c);
    let mut game = game_with_hand(
        GameMode::Classic,
        vec![Some(bar(0)), Some(bar(1)), Some(dot(2))],
    );
    drop_at(&mut game, 0, (0, 0));
    drop_at(&mut game, 1, (4, 0));
    assert_eq!(game.combo(), 1);

    *game.hand_mut() = Hand::from_slots(vec![Some(dot(3)), Some(dot(4)), Some(dot(5))]);
    drop_at(&mut game, 0, (0, 3));
    drop_at(&mut game, 1, (0, 5));
    assert_eq!(game.combo(), 1);
    assert_eq!(game.no_break_streak(), 2);
    drop_at(&mut game, 2, (0, 7));
    assert_eq!(game.no_break_streak(), 3);
    assert_eq!(game.combo(), 0);
}

#[test]
fn test_color_match_of_three() {
    let mut game = game_with_hand(
        GameMode::Classic,
        vec![Some(piece(&[&[1, 1]], 0)), Some(piece(&[&[1, 1]], 1)), None],
    );
    game.board_mut().fill(4, 4, PALETTE[0]);

    let DropOutcome::Placed(report) = drop_at(&mut game, 0, (5, 4)) else {
        panic!("red bar should place");
    };
    assert_eq!(report.color_blocks_removed, 3);
    assert!(report.cleared_anything());
    assert_eq!(game.board().filled_count(), 0);
    assert_eq!(game.total_color_blocks(), 3);
    // combo 0 + 3 / 3, then 2 + 3 * 2 * (1 / 2)
    assert_eq!(game.combo(), 1);
    assert_eq!(report.points(), 5);
    assert_eq!(game.no_break_streak(), 0);
}

#[test]
fn test_game_over_freezes_the_session() {
    let bar = piece(&[&[1, 1]], 0);
    let square = piece(&[&[1, 1, 1], &[1, 1, 1], &[1, 1, 1]], 1);
    let mut game = game_with_hand(
        GameMode::Classic,
        vec![Some(bar), Some(square), Some(square)],
    );
    // Only the bar has room, and only at (1, 0).
    for y in 0..8i8 {
        for x in 0..8i8 {
            let hole = (x + 3 * y) % 4 == 0 || (y == 0 && (x == 1 || x == 2));
            if !hole {
                game.board_mut().fill(x, y, PALETTE[2]);
            }
        }
    }
    assert_eq!(game.count_fittable_pieces(), 1);

    let DropOutcome::Placed(report) = drop_at(&mut game, 0, (1, 0)) else {
        panic!("bar should place");
    };
    assert!(report.game_over);
    assert_eq!(game.phase(), Phase::GameOver);
    assert!(game
        .take_events()
        .iter()
        .any(|e| matches!(e, GameEvent::GameOver { final_score: 2 })));

    let frozen = game.snapshot();
    for _ in 0..3 {
        assert_eq!(game.resolve_drop(None), DropOutcome::Ignored);
        assert!(game.begin_drag(1).is_err());
        assert!(!game.update_hover(0, 0));
    }
    assert_eq!(game.snapshot(), frozen);
    assert!(game.take_events().is_empty());
}

/// Always drop the first piece that fits at its first legal origin.
fn autoplay(game: &mut GameState, max_moves: usize) -> Vec<u64> {
    let mut scores = Vec::new();
    for _ in 0..max_moves {
        if game.game_over() {
            break;
        }
        let slot = game
            .hand()
            .pieces()
            .find(|(_, p)| game.board().has_legal_origin(p))
            .map(|(i, _)| i);
        let Some(slot) = slot else {
            break;
        };
        game.begin_drag(slot).unwrap();
        match game.resolve_drop(None) {
            DropOutcome::Placed(r) => scores.push(r.points_halves),
            other => panic!("unexpected drop outcome {:?}", other),
        }
    }
    scores
}

#[test]
fn test_same_seed_replays_identically() {
    for mode in [GameMode::Classic, GameMode::Chaos] {
        let mut a = GameState::new(mode, 31337);
        let mut b = GameState::new(mode, 31337);
        let sa = autoplay(&mut a, 300);
        let sb = autoplay(&mut b, 300);
        assert!(!sa.is_empty());
        assert_eq!(sa, sb);
        assert_eq!(a.snapshot(), b.snapshot());
    }
}

#[test]
fn test_autoplay_keeps_board_consistent() {
    let mut game = GameState::new(GameMode::Chaos, 5);
    autoplay(&mut game, 400);
    assert!(!game.board().has_hover_marks());
    let n = game.board().size() as usize;
    for y in 0..n {
        assert!(!game.board().is_row_full(y));
    }
    for x in 0..n {
        assert!(!game.board().is_column_full(x));
    }
    assert!(game.pieces_placed() > 0);
    assert!(game.score() >= game.pieces_placed() as u64);
}

#[test]
fn test_app_plays_through_keyboard_actions() {
    let mut app = App::new(GameMode::Classic, 99, ScoreStore::in_memory()).unwrap();
    let slot = app.game().hand().next_occupied(None).unwrap();

    app.apply(PlayerAction::SelectSlot(slot as u8)).unwrap();
    assert_eq!(app.game().dragging_slot(), Some(slot));
    app.apply(PlayerAction::MoveCursor { dx: 1, dy: 1 }).unwrap();
    app.apply(PlayerAction::Drop).unwrap();

    assert_eq!(app.game().pieces_placed(), 1);
    assert!(app.message().starts_with('+'));
    assert_eq!(app.best_score(), Some(app.game().score()));

    app.apply(PlayerAction::Restart).unwrap();
    assert_eq!(app.game().score(), 0);
    assert_eq!(app.scores().records().len(), 2);
}
