use serde::{Deserialize, Serialize};
use std::fmt;

pub const BOARD_SIZE: u8 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Color {
    White,
    Black,
}

impl Color {
    pub fn opponent(self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    /// Row delta of a forward pawn step.
    pub fn forward(self) -> i8 {
        match self {
            Color::White => 1,
            Color::Black => -1,
        }
    }

    pub fn pawn_start_row(self) -> u8 {
        match self {
            Color::White => 2,
            Color::Black => 7,
        }
    }

    pub fn promotion_row(self) -> u8 {
        match self {
            Color::White => 8,
            Color::Black => 1,
        }
    }

    fn back_row(self) -> u8 {
        match self {
            Color::White => 1,
            Color::Black => 8,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::White => write!(f, "WHITE"),
            Color::Black => write!(f, "BLACK"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PieceKind {
    King,
    Queen,
    Rook,
    Bishop,
    Knight,
    Pawn,
}

impl PieceKind {
    /// Kinds a pawn may turn into on the far rank.
    pub const PROMOTIONS: [PieceKind; 4] = [
        PieceKind::Queen,
        PieceKind::Rook,
        PieceKind::Bishop,
        PieceKind::Knight,
    ];

    fn fen_char(self) -> char {
        match self {
            PieceKind::King => 'k',
            PieceKind::Queen => 'q',
            PieceKind::Rook => 'r',
            PieceKind::Bishop => 'b',
            PieceKind::Knight => 'n',
            PieceKind::Pawn => 'p',
        }
    }

    fn from_fen_char(c: char) -> Option<PieceKind> {
        match c.to_ascii_lowercase() {
            'k' => Some(PieceKind::King),
            'q' => Some(PieceKind::Queen),
            'r' => Some(PieceKind::Rook),
            'b' => Some(PieceKind::Bishop),
            'n' => Some(PieceKind::Knight),
            'p' => Some(PieceKind::Pawn),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Piece {
    pub color: Color,
    pub kind: PieceKind,
}

impl Piece {
    pub const fn new(color: Color, kind: PieceKind) -> Self {
        Self { color, kind }
    }
}

/// A square on the board. Rows and columns both run 1..=8; row 1 is White's
/// back rank and column 1 is the a-file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawPosition")]
pub struct Position {
    row: u8,
    column: u8,
}

#[derive(Deserialize)]
struct RawPosition {
    row: i64,
    column: i64,
}

impl TryFrom<RawPosition> for Position {
    type Error = String;

    fn try_from(raw: RawPosition) -> Result<Self, Self::Error> {
        let row = u8::try_from(raw.row).ok();
        let column = u8::try_from(raw.column).ok();
        row.zip(column)
            .and_then(|(row, column)| Position::new(row, column))
            .ok_or_else(|| format!("position ({}, {}) is off the board", raw.row, raw.column))
    }
}

impl Position {
    pub fn new(row: u8, column: u8) -> Option<Self> {
        if (1..=BOARD_SIZE).contains(&row) && (1..=BOARD_SIZE).contains(&column) {
            Some(Self { row, column })
        } else {
            None
        }
    }

    pub fn row(self) -> u8 {
        self.row
    }

    pub fn column(self) -> u8 {
        self.column
    }

    /// The square `(d_row, d_col)` away, or `None` when that leaves the board.
    pub fn offset(self, d_row: i8, d_col: i8) -> Option<Position> {
        let row = self.row as i8 + d_row;
        let column = self.column as i8 + d_col;
        if row < 1 || column < 1 {
            return None;
        }
        Position::new(row as u8, column as u8)
    }

    /// Parses algebraic square names such as `e4`.
    pub fn from_algebraic(square: &str) -> Option<Position> {
        let mut chars = square.chars();
        let file = chars.next()?.to_ascii_lowercase();
        let rank = chars.next()?.to_digit(10)?;
        if chars.next().is_some() || !('a'..='h').contains(&file) {
            return None;
        }
        Position::new(rank as u8, file as u8 - b'a' + 1)
    }

    pub fn all() -> impl Iterator<Item = Position> {
        (1..=BOARD_SIZE)
            .flat_map(|row| (1..=BOARD_SIZE).map(move |column| Position { row, column }))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let file = (b'a' + self.column - 1) as char;
        write!(f, "{}{}", file, self.row)
    }
}

/// Fixed 8x8 grid of optional pieces, indexed `[row - 1][column - 1]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    squares: [[Option<Piece>; 8]; 8],
}

impl Default for Board {
    fn default() -> Self {
        Self::standard()
    }
}

impl Board {
    pub fn empty() -> Self {
        Self {
            squares: [[None; 8]; 8],
        }
    }

    /// The standard starting layout.
    pub fn standard() -> Self {
        const BACK_RANK: [PieceKind; 8] = [
            PieceKind::Rook,
            PieceKind::Knight,
            PieceKind::Bishop,
            PieceKind::Queen,
            PieceKind::King,
            PieceKind::Bishop,
            PieceKind::Knight,
            PieceKind::Rook,
        ];

        let mut board = Self::empty();
        for color in [Color::White, Color::Black] {
            for (idx, kind) in BACK_RANK.iter().enumerate() {
                board.squares[(color.back_row() - 1) as usize][idx] = Some(Piece::new(color, *kind));
                board.squares[(color.pawn_start_row() - 1) as usize][idx] =
                    Some(Piece::new(color, PieceKind::Pawn));
            }
        }
        board
    }

    pub fn piece_at(&self, position: Position) -> Option<Piece> {
        self.squares[(position.row - 1) as usize][(position.column - 1) as usize]
    }

    pub fn set_piece(&mut self, position: Position, piece: Option<Piece>) {
        self.squares[(position.row - 1) as usize][(position.column - 1) as usize] = piece;
    }

    pub fn remove_piece(&mut self, position: Position) -> Option<Piece> {
        let piece = self.piece_at(position);
        self.set_piece(position, None);
        piece
    }

    /// Occupied squares in row-major order.
    pub fn pieces(&self) -> impl Iterator<Item = (Position, Piece)> + '_ {
        Position::all().filter_map(move |pos| self.piece_at(pos).map(|piece| (pos, piece)))
    }

    pub fn find_king(&self, color: Color) -> Option<Position> {
        self.pieces()
            .find(|(_, piece)| piece.color == color && piece.kind == PieceKind::King)
            .map(|(pos, _)| pos)
    }

    /// Placement field of a FEN record, rank 8 first.
    pub fn fen_placement(&self) -> String {
        let mut out = String::with_capacity(72);
        for row in (1..=BOARD_SIZE).rev() {
            let mut empty = 0;
            for column in 1..=BOARD_SIZE {
                match self.squares[(row - 1) as usize][(column - 1) as usize] {
                    Some(piece) => {
                        if empty > 0 {
                            out.push_str(&empty.to_string());
                            empty = 0;
                        }
                        let c = piece.kind.fen_char();
                        out.push(match piece.color {
                            Color::White => c.to_ascii_uppercase(),
                            Color::Black => c,
                        });
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                out.push_str(&empty.to_string());
            }
            if row > 1 {
                out.push('/');
            }
        }
        out
    }

    /// Builds a board from the placement field of a FEN record. Anything after
    /// the first space is ignored.
    pub fn from_fen_placement(fen: &str) -> Option<Board> {
        let placement = fen.split_whitespace().next()?;
        let ranks: Vec<&str> = placement.split('/').collect();
        if ranks.len() != BOARD_SIZE as usize {
            return None;
        }

        let mut board = Board::empty();
        for (idx, rank) in ranks.iter().enumerate() {
            let row = BOARD_SIZE - idx as u8;
            let mut column = 1u8;
            for c in rank.chars() {
                if let Some(skip) = c.to_digit(10) {
                    column = column.saturating_add(skip as u8);
                    continue;
                }
                let kind = PieceKind::from_fen_char(c)?;
                let color = if c.is_ascii_uppercase() {
                    Color::White
                } else {
                    Color::Black
                };
                board.set_piece(Position::new(row, column)?, Some(Piece::new(color, kind)));
                column += 1;
            }
            if column != BOARD_SIZE + 1 {
                return None;
            }
        }
        Some(board)
    }
}
