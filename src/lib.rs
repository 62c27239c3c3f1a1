//! Crate root module declarations for the Quince Chess engine.
//!
//! Exposes the board model, attack tables, legal move generation, perft,
//! search and notation helpers under stable module paths for the CLI,
//! benches, tests and external tooling.

pub mod errors;

pub mod game_state {
    pub mod chess_rules;
    pub mod chess_types;
    pub mod game_state;
    pub mod undo_state;
}

pub mod moves {
    pub mod leaper_attacks;
    pub mod magic_tables;
    pub mod move_descriptions;
    pub mod ray_masks;
    pub mod slider_attacks;
}

pub mod move_generation {
    pub mod legal_move_apply;
    pub mod legal_move_checks;
    pub mod legal_move_generator;
    pub mod legal_moves_king;
    pub mod legal_moves_pawn;
    pub mod legal_moves_pieces;
    pub mod perft;
}

pub mod search {
    pub mod board_scoring;
    pub mod draw_detection;
    pub mod iterative_deepening;
    pub mod move_ordering;
    pub mod quiescence;
    pub mod static_exchange;
    pub mod threading;
    pub mod time_management;
    pub mod transposition_table;
    pub mod zobrist;
}

pub mod utils {
    pub mod algebraic;
    pub mod fen_generator;
    pub mod fen_parser;
    pub mod long_algebraic;
    pub mod render_game_state;
    pub mod san;
}
