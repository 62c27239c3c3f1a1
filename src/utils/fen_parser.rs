//! FEN-to-GameState parser.
//!
//! Builds fully-populated incremental state from a Forsyth-Edwards Notation
//! string: mailbox, piece bitboards, rights, clocks, occupancies and the
//! Zobrist key, with the starting key seeded into the repetition history.

use crate::errors::FenError;
use crate::game_state::chess_rules::{BACK_RANKS, CASTLING_MOVES};
use crate::game_state::{chess_types::*, game_state::GameState};
use crate::moves::leaper_attacks::pawn_attacks;
use crate::search::zobrist::compute_zobrist_key;
use crate::utils::algebraic::algebraic_to_square;

pub fn parse_fen(fen: &str) -> Result<GameState, FenError> {
    let mut parts = fen.split_whitespace();

    let board_part = parts.next().ok_or(FenError::MissingField("board layout"))?;
    let side_part = parts.next().ok_or(FenError::MissingField("side to move"))?;
    let castling_part = parts.next().ok_or(FenError::MissingField("castling rights"))?;
    let en_passant_part = parts.next().ok_or(FenError::MissingField("en-passant square"))?;
    let halfmove_part = parts.next().ok_or(FenError::MissingField("halfmove clock"))?;
    let fullmove_part = parts.next().ok_or(FenError::MissingField("fullmove number"))?;

    if parts.next().is_some() {
        return Err(FenError::TrailingFields);
    }

    let mut game_state = GameState::new_empty();

    parse_board(board_part, &mut game_state)?;
    for color in [Color::Light, Color::Dark] {
        if game_state.piece_count_for(color, PieceKind::King) != 1 {
            return Err(FenError::KingCount);
        }
        if game_state.pieces_of(color, PieceKind::Pawn) & BACK_RANKS != 0 {
            return Err(FenError::PawnOnBackRank);
        }
    }

    game_state.side_to_move = parse_side_to_move(side_part)?;
    if game_state.is_color_in_check(game_state.side_to_move.opposite()) {
        return Err(FenError::OpponentInCheck);
    }
    game_state.castling_rights =
        parse_castling_rights(castling_part)? & supported_castling_rights(&game_state);
    game_state.en_passant_square = parse_en_passant_square(en_passant_part)?
        .filter(|&ep| en_passant_is_usable(&game_state, ep));
    game_state.halfmove_clock = parse_counter("halfmove clock", halfmove_part)?;
    game_state.fullmove_number = parse_counter("fullmove number", fullmove_part)?;

    game_state.zobrist_key = compute_zobrist_key(&game_state);
    game_state.repetition_history.push(game_state.zobrist_key);

    Ok(game_state)
}

fn parse_board(board_part: &str, game_state: &mut GameState) -> Result<(), FenError> {
    let ranks: Vec<&str> = board_part.split('/').collect();
    if ranks.len() != 8 {
        return Err(FenError::RankCount(ranks.len()));
    }

    for (fen_rank_idx, rank_str) in ranks.iter().enumerate() {
        let board_rank = 7 - fen_rank_idx;
        let mut file = 0usize;

        for ch in rank_str.chars() {
            if let Some(empty_count) = ch.to_digit(10) {
                if !(1..=8).contains(&empty_count) {
                    return Err(FenError::RankWidth { rank: board_rank + 1 });
                }
                file += empty_count as usize;
                continue;
            }

            let (color, piece) = piece_from_fen_char(ch).ok_or(FenError::InvalidPiece(ch))?;

            if file >= 8 {
                return Err(FenError::RankWidth { rank: board_rank + 1 });
            }

            game_state.put_piece(color, piece, (board_rank * 8 + file) as Square);
            file += 1;
        }

        if file != 8 {
            return Err(FenError::RankWidth { rank: board_rank + 1 });
        }
    }

    Ok(())
}

fn parse_side_to_move(side_part: &str) -> Result<Color, FenError> {
    match side_part {
        "w" => Ok(Color::Light),
        "b" => Ok(Color::Dark),
        _ => Err(FenError::InvalidSide(side_part.to_owned())),
    }
}

fn parse_castling_rights(castling_part: &str) -> Result<CastlingRights, FenError> {
    if castling_part == "-" {
        return Ok(0);
    }

    let mut rights: CastlingRights = 0;

    for ch in castling_part.chars() {
        match ch {
            'K' => rights |= CASTLE_LIGHT_KINGSIDE,
            'Q' => rights |= CASTLE_LIGHT_QUEENSIDE,
            'k' => rights |= CASTLE_DARK_KINGSIDE,
            'q' => rights |= CASTLE_DARK_QUEENSIDE,
            _ => return Err(FenError::InvalidCastling(ch)),
        }
    }

    Ok(rights)
}

/// Rights whose king and rook still stand on their home squares. Rights the
/// board cannot back are dropped so the generator never castles a missing rook.
fn supported_castling_rights(game_state: &GameState) -> CastlingRights {
    let mut supported = 0;
    for color in [Color::Light, Color::Dark] {
        for castle in CASTLING_MOVES[color.index()] {
            let king_home = game_state.piece_on(castle.king_from) == Some((color, PieceKind::King));
            let rook_home = game_state.piece_on(castle.rook_from) == Some((color, PieceKind::Rook));
            if king_home && rook_home {
                supported |= castle.right;
            }
        }
    }
    supported
}

fn parse_en_passant_square(en_passant_part: &str) -> Result<Option<Square>, FenError> {
    if en_passant_part == "-" {
        return Ok(None);
    }

    let square = algebraic_to_square(en_passant_part)
        .map_err(|_| FenError::InvalidEnPassant(en_passant_part.to_owned()))?;
    if !matches!(square_rank(square), 2 | 5) {
        return Err(FenError::InvalidEnPassant(en_passant_part.to_owned()));
    }

    Ok(Some(square))
}

/// Targets no pawn of the side to move can capture onto are dropped, keeping
/// the key identical to the one reached by playing the double push.
fn en_passant_is_usable(game_state: &GameState, ep: Square) -> bool {
    let us = game_state.side_to_move;
    pawn_attacks(us.opposite(), ep) & game_state.pieces_of(us, PieceKind::Pawn) != 0
}

fn parse_counter(field: &'static str, value: &str) -> Result<u16, FenError> {
    value.parse::<u16>().map_err(|_| FenError::InvalidCounter {
        field,
        value: value.to_owned(),
    })
}

pub(crate) fn piece_from_fen_char(ch: char) -> Option<Piece> {
    let color = if ch.is_ascii_uppercase() {
        Color::Light
    } else if ch.is_ascii_lowercase() {
        Color::Dark
    } else {
        return None;
    };

    let piece = match ch.to_ascii_lowercase() {
        'p' => PieceKind::Pawn,
        'n' => PieceKind::Knight,
        'b' => PieceKind::Bishop,
        'r' => PieceKind::Rook,
        'q' => PieceKind::Queen,
        'k' => PieceKind::King,
        _ => return None,
    };

    Some((color, piece))
}

#[cfg(test)]
mod tests {
    use super::parse_fen;
    use crate::errors::FenError;
    use crate::game_state::chess_rules::STARTING_POSITION_FEN;
    use crate::game_state::chess_types::*;

    #[test]
    fn parse_starting_fen() {
        let game_state = parse_fen(STARTING_POSITION_FEN).expect("starting FEN should parse");

        assert_eq!(game_state.side_to_move, Color::Light);
        assert_eq!(game_state.fullmove_number, 1);
        assert_eq!(game_state.halfmove_clock, 0);
        assert_eq!(game_state.castling_rights, CASTLE_ALL);
        assert_eq!(game_state.repetition_history, vec![game_state.zobrist_key]);
        game_state
            .validate_consistency()
            .expect("parsed state should be consistent");
    }

    #[test]
    fn drops_en_passant_target_nobody_can_capture_onto() {
        let kept = parse_fen("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 1").expect("FEN should parse");
        assert_eq!(kept.en_passant_square, Some(43));
        let dropped = parse_fen("4k3/8/8/3p4/8/8/8/4K3 w - d6 0 1").expect("FEN should parse");
        assert_eq!(dropped.en_passant_square, None);
    }

    #[test]
    fn reports_missing_fields_and_bad_pieces() {
        assert_eq!(
            parse_fen("8/8/8/8/8/8/8/8 w").map(|_| ()),
            Err(FenError::MissingField("castling rights"))
        );
        assert_eq!(
            parse_fen("4k3/8/8/8/8/8/8/4X3 w - - 0 1").map(|_| ()),
            Err(FenError::InvalidPiece('X'))
        );
        assert_eq!(
            parse_fen("4k3/8/8/8/8/8/8 w - - 0 1").map(|_| ()),
            Err(FenError::RankCount(7))
        );
        assert_eq!(
            parse_fen("4k3/8/8/8/8/8/8/4K4 w - - 0 1").map(|_| ()),
            Err(FenError::RankWidth { rank: 1 })
        );
        assert_eq!(
            parse_fen("8/8/8/8/8/8/8/4K3 w - - 0 1").map(|_| ()),
            Err(FenError::KingCount)
        );
        assert_eq!(
            parse_fen("4k2P/8/8/8/8/8/8/4K3 w - - 0 1").map(|_| ()),
            Err(FenError::PawnOnBackRank)
        );
        assert_eq!(
            parse_fen("7k/P7/8/8/8/8/8/4K2R w - - 0 1").map(|_| ()),
            Err(FenError::OpponentInCheck)
        );
        assert!(parse_fen("7k/P7/8/8/8/8/8/4K2R b - - 0 1").is_ok());
        assert!(matches!(
            parse_fen("4k3/8/8/8/8/8/8/4K3 x - - 0 1"),
            Err(FenError::InvalidSide(_))
        ));
        assert!(matches!(
            parse_fen("4k3/8/8/8/8/8/8/4K3 w - e4 0 1"),
            Err(FenError::InvalidEnPassant(_))
        ));
        assert!(matches!(
            parse_fen("4k3/8/8/8/8/8/8/4K3 w - - x 1"),
            Err(FenError::InvalidCounter { .. })
        ));
    }

    #[test]
    fn drops_castling_rights_without_home_rook() {
        let game = parse_fen("4k3/8/8/8/8/8/8/4K2R w KQkq - 0 1").expect("FEN should parse");
        assert_eq!(game.castling_rights, CASTLE_LIGHT_KINGSIDE);
    }
}
