use super::board::{Color, PieceKind};
use super::moves::ChessMove;
use super::rules::{ChessGame, GameStatus};

/// Convert a color to its lowercase name
pub fn color_to_string(color: Color) -> String {
    match color {
        Color::White => "white".to_string(),
        Color::Black => "black".to_string(),
    }
}

pub fn piece_name(kind: PieceKind) -> &'static str {
    match kind {
        PieceKind::King => "king",
        PieceKind::Queen => "queen",
        PieceKind::Rook => "rook",
        PieceKind::Bishop => "bishop",
        PieceKind::Knight => "knight",
        PieceKind::Pawn => "pawn",
    }
}

/// Get the game status as a string
pub fn get_game_status(game: &ChessGame) -> String {
    match game.status() {
        GameStatus::Checkmate => match game.turn() {
            Color::White => "black_wins".to_string(),
            Color::Black => "white_wins".to_string(),
        },
        GameStatus::Stalemate => "stalemate".to_string(),
        GameStatus::Over => "over".to_string(),
        GameStatus::Check => "check".to_string(),
        GameStatus::InProgress => format!("{}_turn", color_to_string(game.turn())),
    }
}

/// "alice moved knight from g1 to f3", with the promotion appended when there is one.
pub fn describe_move(username: &str, moved: PieceKind, mv: &ChessMove) -> String {
    let mut text = format!(
        "{} moved {} from {} to {}",
        username,
        piece_name(moved),
        mv.start,
        mv.end
    );
    if let Some(kind) = mv.promotion {
        text.push_str(&format!(", promoting to {}", piece_name(kind)));
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::board::Position;

    #[test]
    fn status_strings() {
        let game = ChessGame::new();
        assert_eq!(get_game_status(&game), "white_turn");

        let mut over = ChessGame::new();
        over.set_over();
        assert_eq!(get_game_status(&over), "over");
    }

    #[test]
    fn move_descriptions() {
        let mv = ChessMove::new(
            Position::from_algebraic("g7").unwrap(),
            Position::from_algebraic("g8").unwrap(),
            Some(PieceKind::Queen),
        );
        assert_eq!(
            describe_move("bob", PieceKind::Pawn, &mv),
            "bob moved pawn from g7 to g8, promoting to queen"
        );
    }
}
