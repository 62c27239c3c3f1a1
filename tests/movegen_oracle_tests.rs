/// Cross-checks the bitboard legal move generator against a slow mailbox
/// generator on seeded random playouts.
use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use quince_chess::game_state::chess_types::*;
use quince_chess::move_generation::legal_move_apply::{make_move_in_place, unmake_move_in_place};
use quince_chess::move_generation::legal_move_generator::generate_legal_moves;
use quince_chess::moves::move_descriptions::{
    move_from, move_gives_check, move_promotion_piece, move_to, MoveList,
};

type Board = [Option<Piece>; 64];
type Triple = (Square, Square, Option<PieceKind>);

const KNIGHT_STEPS: [(i8, i8); 8] = [
    (1, 2), (2, 1), (2, -1), (1, -2), (-1, -2), (-2, -1), (-2, 1), (-1, 2),
];
const KING_STEPS: [(i8, i8); 8] = [
    (1, 0), (1, 1), (0, 1), (-1, 1), (-1, 0), (-1, -1), (0, -1), (1, -1),
];
const ROOK_DIRS: [(i8, i8); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
const BISHOP_DIRS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];

fn offset(square: Square, (df, dr): (i8, i8)) -> Option<Square> {
    let file = (square % 8) as i8 + df;
    let rank = (square / 8) as i8 + dr;
    ((0..8).contains(&file) && (0..8).contains(&rank)).then(|| (rank * 8 + file) as Square)
}

fn slides(board: &Board, from: Square, dirs: &[(i8, i8)]) -> Vec<Square> {
    let mut out = Vec::new();
    for &dir in dirs {
        let mut current = from;
        while let Some(next) = offset(current, dir) {
            out.push(next);
            if board[next as usize].is_some() {
                break;
            }
            current = next;
        }
    }
    out
}

fn attacked_by(board: &Board, square: Square, by: Color) -> bool {
    let holds = |sq: Square, kind: PieceKind| board[sq as usize] == Some((by, kind));

    let pawn_rank = if by == Color::Light { -1 } else { 1 };
    if [(-1, pawn_rank), (1, pawn_rank)]
        .into_iter()
        .filter_map(|step| offset(square, step))
        .any(|sq| holds(sq, PieceKind::Pawn))
    {
        return true;
    }
    if KNIGHT_STEPS
        .into_iter()
        .filter_map(|step| offset(square, step))
        .any(|sq| holds(sq, PieceKind::Knight))
    {
        return true;
    }
    if KING_STEPS
        .into_iter()
        .filter_map(|step| offset(square, step))
        .any(|sq| holds(sq, PieceKind::King))
    {
        return true;
    }
    slides(board, square, &ROOK_DIRS)
        .into_iter()
        .any(|sq| holds(sq, PieceKind::Rook) || holds(sq, PieceKind::Queen))
        || slides(board, square, &BISHOP_DIRS)
            .into_iter()
            .any(|sq| holds(sq, PieceKind::Bishop) || holds(sq, PieceKind::Queen))
}

fn king_of(board: &Board, color: Color) -> Square {
    (0..64u8)
        .find(|&sq| board[sq as usize] == Some((color, PieceKind::King)))
        .expect("every test position should have both kings")
}

fn pseudo_legal(state: &GameState) -> Vec<Triple> {
    let board = &state.board;
    let us = state.side_to_move;
    let mut out = Vec::new();
    let push_pawn = |from: Square, to: Square, out: &mut Vec<Triple>| {
        if us.relative_rank(to) == 7 {
            for kind in PROMOTION_PIECE_KINDS {
                out.push((from, to, Some(kind)));
            }
        } else {
            out.push((from, to, None));
        }
    };

    for from in 0..64u8 {
        let Some((color, kind)) = board[from as usize] else {
            continue;
        };
        if color != us {
            continue;
        }
        let targets: Vec<Square> = match kind {
            PieceKind::Pawn => {
                let forward = if us == Color::Light { 1 } else { -1 };
                if let Some(one) = offset(from, (0, forward)) {
                    if board[one as usize].is_none() {
                        push_pawn(from, one, &mut out);
                        if us.relative_rank(from) == 1 {
                            if let Some(two) = offset(one, (0, forward)) {
                                if board[two as usize].is_none() {
                                    out.push((from, two, None));
                                }
                            }
                        }
                    }
                }
                for side in [-1, 1] {
                    if let Some(to) = offset(from, (side, forward)) {
                        let enemy = matches!(board[to as usize], Some((c, _)) if c != us);
                        if enemy || state.en_passant_square == Some(to) {
                            push_pawn(from, to, &mut out);
                        }
                    }
                }
                Vec::new()
            }
            PieceKind::Knight => KNIGHT_STEPS.into_iter().filter_map(|s| offset(from, s)).collect(),
            PieceKind::King => KING_STEPS.into_iter().filter_map(|s| offset(from, s)).collect(),
            PieceKind::Bishop => slides(board, from, &BISHOP_DIRS),
            PieceKind::Rook => slides(board, from, &ROOK_DIRS),
            PieceKind::Queen => {
                let mut all = slides(board, from, &ROOK_DIRS);
                all.extend(slides(board, from, &BISHOP_DIRS));
                all
            }
        };
        for to in targets {
            if !matches!(board[to as usize], Some((c, _)) if c == us) {
                out.push((from, to, None));
            }
        }
    }

    let them = us.opposite();
    for option in CASTLING_OPTIONS[us.index()] {
        let (right, king_from, king_to, rook_from, between, crossed) = option;
        if state.castling_rights & right == 0
            || board[rook_from as usize] != Some((us, PieceKind::Rook))
            || board[king_from as usize] != Some((us, PieceKind::King))
        {
            continue;
        }
        if between.iter().any(|&sq| board[sq as usize].is_some()) {
            continue;
        }
        if crossed.iter().any(|&sq| attacked_by(board, sq, them)) {
            continue;
        }
        out.push((king_from, king_to, None));
    }
    out
}

type CastlingOption = (CastlingRights, Square, Square, Square, &'static [Square], &'static [Square]);

const CASTLING_OPTIONS: [[CastlingOption; 2]; 2] = [
    [
        (CASTLE_LIGHT_KINGSIDE, 4, 6, 7, &[5, 6], &[4, 5, 6]),
        (CASTLE_LIGHT_QUEENSIDE, 4, 2, 0, &[1, 2, 3], &[2, 3, 4]),
    ],
    [
        (CASTLE_DARK_KINGSIDE, 60, 62, 63, &[61, 62], &[60, 61, 62]),
        (CASTLE_DARK_QUEENSIDE, 60, 58, 56, &[57, 58, 59], &[58, 59, 60]),
    ],
];

fn play_on_mailbox(state: &GameState, (from, to, promotion): Triple) -> Board {
    let mut board = state.board;
    let moving = board[from as usize].expect("origin square should be occupied");
    if moving.1 == PieceKind::Pawn && state.en_passant_square == Some(to) && board[to as usize].is_none() {
        let victim = if moving.0 == Color::Light { to - 8 } else { to + 8 };
        board[victim as usize] = None;
    }
    if moving.1 == PieceKind::King && from.abs_diff(to) == 2 {
        let (rook_from, rook_to) = if to > from { (from + 3, from + 1) } else { (from - 4, from - 1) };
        board[rook_to as usize] = board[rook_from as usize].take();
    }
    board[from as usize] = None;
    board[to as usize] = Some(promotion.map_or(moving, |kind| (moving.0, kind)));
    board
}

fn oracle_moves(state: &GameState) -> HashSet<Triple> {
    let us = state.side_to_move;
    pseudo_legal(state)
        .into_iter()
        .filter(|&triple| {
            let board = play_on_mailbox(state, triple);
            !attacked_by(&board, king_of(&board, us), us.opposite())
        })
        .collect()
}

fn generated_moves(state: &GameState, list: &MoveList) -> HashSet<Triple> {
    let set: HashSet<Triple> = list
        .iter()
        .map(|mv| (move_from(mv), move_to(mv), move_promotion_piece(mv)))
        .collect();
    assert_eq!(set.len(), list.len(), "duplicate move in {}", state.get_fen());
    set
}

fn check_position(state: &mut GameState) {
    let mut list = MoveList::new();
    generate_legal_moves(state, &mut list);
    assert_eq!(
        generated_moves(state, &list),
        oracle_moves(state),
        "legal move mismatch in {}",
        state.get_fen()
    );

    for mv in list.iter() {
        make_move_in_place(state, mv);
        assert_eq!(
            state.is_in_check(),
            move_gives_check(mv),
            "gives-check flag wrong for {:?} -> {}",
            (move_from(mv), move_to(mv)),
            state.get_fen()
        );
        unmake_move_in_place(state);
    }
}

fn random_playouts(start_fen: &str, seed: u64, games: usize, max_plies: usize) {
    let mut rng = StdRng::seed_from_u64(seed);
    for _ in 0..games {
        let mut state = GameState::from_fen(start_fen).expect("FEN should parse");
        for _ in 0..max_plies {
            check_position(&mut state);
            let mut list = MoveList::new();
            generate_legal_moves(&state, &mut list);
            if list.is_empty() {
                break;
            }
            let pick = rng.random_range(0..list.len());
            let mv = list.get(pick).expect("index should be in range");
            make_move_in_place(&mut state, mv);
        }
    }
}

#[test]
fn random_games_from_start_match_oracle() {
    random_playouts(
        "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
        0x5EED_0001,
        12,
        120,
    );
}

#[test]
fn random_games_from_kiwipete_match_oracle() {
    random_playouts(
        "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        0x5EED_0002,
        12,
        80,
    );
}

#[test]
fn random_games_from_promotion_position_match_oracle() {
    random_playouts(
        "n1n5/PPPk4/8/8/8/8/4Kppp/5N1N b - - 0 1",
        0x5EED_0003,
        12,
        60,
    );
}

#[test]
fn en_passant_discovering_rank_check_is_excluded() {
    // Capturing on d6 would expose the a5 king to the h5 rook.
    let mut state = GameState::from_fen("8/8/8/K2pP2r/8/8/8/7k w - d6 0 1").expect("FEN should parse");
    check_position(&mut state);
    let mut list = MoveList::new();
    generate_legal_moves(&state, &mut list);
    assert!(!list.iter().any(|mv| move_from(mv) == 36 && move_to(mv) == 43));
}

#[test]
fn pinned_and_checked_positions_match_oracle() {
    for fen in [
        "4k3/8/8/8/8/8/4r3/R3K2R w KQ - 0 1",
        "4k3/4r3/8/8/8/8/4B3/4K3 w - - 0 1",
        "4k3/8/8/1b6/8/3N4/8/5K2 w - - 0 1",
        "r3k2r/8/8/8/8/8/8/R3K2R b KQkq - 0 1",
        "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
    ] {
        let mut state = GameState::from_fen(fen).expect("FEN should parse");
        check_position(&mut state);
    }
}
