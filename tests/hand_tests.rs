use circle_pop::core::hand::colors_for_hand;
use circle_pop::core::pieces::{find_shape, shape_for_draw, total_weight};
use circle_pop::core::{deal_piece, generate_hand, Board, ColorPool, SimpleRng, CATALOG};
use circle_pop::types::{MAX_HAND_ATTEMPTS, PALETTE};

#[test]
fn test_catalog_weights_and_draw_order() {
    assert_eq!(CATALOG.len(), 24);
    assert!(CATALOG.iter().all(|s| s.weight > 0));
    assert_eq!(total_weight(), 102);

    assert!(std::ptr::eq(shape_for_draw(0), &CATALOG[0]));
    assert!(std::ptr::eq(shape_for_draw(3), &CATALOG[0]));
    assert!(std::ptr::eq(shape_for_draw(4), &CATALOG[1]));
    assert!(std::ptr::eq(shape_for_draw(101), &CATALOG[23]));
    assert!(std::ptr::eq(shape_for_draw(500), &CATALOG[23]));
}

#[test]
fn test_find_shape_matches_catalog() {
    let square = find_shape(&[&[1, 1], &[1, 1]]).unwrap();
    assert_eq!(square.block_count(), 4);
    assert_eq!((square.width(), square.height()), (2, 2));
    assert!(find_shape(&[&[1, 1, 1, 1, 1]]).is_none());
}

#[test]
fn test_deal_piece_binds_color() {
    let mut rng = SimpleRng::new(77);
    for _ in 0..50 {
        let p = deal_piece(&mut rng, Some(PALETTE[6]));
        assert_eq!(p.color(), PALETTE[6]);
        let q = deal_piece(&mut rng, None);
        assert!(PALETTE.contains(&q.color()));
    }
}

#[test]
fn test_hand_colors_are_distinct_pool_prefix() {
    let pool = ColorPool::full();
    let mut rng = SimpleRng::new(9);
    let deal = generate_hand(5, &pool, None, 0, &mut rng);

    assert_eq!(deal.attempts, 1);
    assert!(!deal.exhausted);
    assert_eq!(deal.hand.size(), 5);
    assert_eq!(deal.hand.remaining(), 5);

    let colors: Vec<_> = deal.hand.pieces().map(|(_, p)| p.color()).collect();
    for c in &PALETTE[..5] {
        assert_eq!(colors.iter().filter(|x| *x == c).count(), 1);
    }
}

#[test]
fn test_short_pool_is_topped_up_with_unused_colors() {
    let pool = ColorPool::from_colors(vec![PALETTE[4]]);
    let mut rng = SimpleRng::new(3);
    let mut colors = colors_for_hand(3, &pool, &mut rng);
    colors.sort_by_key(|c| PALETTE.iter().position(|p| p == c));
    assert_eq!(colors, vec![PALETTE[0], PALETTE[1], PALETTE[4]]);
}

#[test]
fn test_oversized_hand_repeats_colors() {
    let mut rng = SimpleRng::new(3);
    let colors = colors_for_hand(10, &ColorPool::full(), &mut rng);
    assert_eq!(colors.len(), 10);
    for c in PALETTE.iter() {
        assert!(colors.contains(c));
    }
}

#[test]
fn test_pool_resets_after_last_color() {
    let mut pool = ColorPool::from_colors(vec![PALETTE[2], PALETTE[3]]);
    assert!(!pool.remove(PALETTE[2]));
    assert!(!pool.remove(PALETTE[7]));
    assert_eq!(pool.colors(), &[PALETTE[3]]);
    assert!(pool.remove(PALETTE[3]));
    assert_eq!(pool.len(), PALETTE.len());
}

#[test]
fn test_generation_gives_up_on_a_full_board() {
    let mut board = Board::new(8);
    for y in 0..8 {
        for x in 0..8 {
            board.fill(x, y, PALETTE[0]);
        }
    }
    let mut rng = SimpleRng::new(11);
    let deal = generate_hand(3, &ColorPool::full(), Some(&board), 2, &mut rng);
    assert!(deal.exhausted);
    assert_eq!(deal.attempts, MAX_HAND_ATTEMPTS);
    assert_eq!(deal.hand.remaining(), 3);
}

#[test]
fn test_generation_meets_floor_on_open_board() {
    let board = Board::new(8);
    let mut rng = SimpleRng::new(11);
    let deal = generate_hand(3, &ColorPool::full(), Some(&board), 2, &mut rng);
    assert!(!deal.exhausted);
    assert_eq!(deal.attempts, 1);
    assert_eq!(board.count_fittable_pieces(&deal.hand), 3);
}

#[test]
fn test_generation_is_deterministic() {
    let board = Board::new(10);
    let pool = ColorPool::full();
    let a = generate_hand(5, &pool, Some(&board), 2, &mut SimpleRng::new(2024));
    let b = generate_hand(5, &pool, Some(&board), 2, &mut SimpleRng::new(2024));
    assert_eq!(a, b);
}

/// An 8x8 board with roughly `percent` of its cells filled.
fn scattered_board(rng: &mut SimpleRng, percent: u32) -> Board {
    let mut board = Board::new(8);
    for y in 0..8 {
        for x in 0..8 {
            if rng.next_range(100) < percent {
                board.fill(x, y, PALETTE[rng.next_range(PALETTE.len() as u32) as usize]);
            }
        }
    }
    board
}

#[test]
fn test_generation_redraws_until_two_pieces_fit() {
    let mut board_rng = SimpleRng::new(606);
    let mut deal_rng = SimpleRng::new(808);
    let mut redrawn_and_accepted = 0;

    for _ in 0..300 {
        let percent = 40 + board_rng.next_range(36);
        let board = scattered_board(&mut board_rng, percent);
        let deal = generate_hand(3, &ColorPool::full(), Some(&board), 2, &mut deal_rng);
        let fit = board.count_fittable_pieces(&deal.hand);

        assert!(deal.attempts >= 1 && deal.attempts <= MAX_HAND_ATTEMPTS);
        if deal.exhausted {
            assert_eq!(deal.attempts, MAX_HAND_ATTEMPTS);
        } else {
            assert!(fit >= 2, "accepted a hand with {} fitting pieces", fit);
        }
        if deal.attempts > 1 && !deal.exhausted {
            redrawn_and_accepted += 1;
        }
    }

    assert!(redrawn_and_accepted > 0);
}
