//! Keyboard input and text rendering for interactive play.

use std::io::{self, Write};

use merge_2048_core::{Command, Direction, RenderHook, TileView};

pub const CONTROLS: &str =
    "Controls: WASD or Arrow Keys | R to restart | K to keep playing | Q to quit";

pub enum InputAction {
    Command(Command),
    Quit,
    None,
}

pub fn parse_input(bytes: &[u8]) -> InputAction {
    match bytes {
        // Arrow keys (escape sequences)
        [27, 91, 65] => InputAction::Command(Command::Move(Direction::Up)),
        [27, 91, 66] => InputAction::Command(Command::Move(Direction::Down)),
        [27, 91, 67] => InputAction::Command(Command::Move(Direction::Right)),
        [27, 91, 68] => InputAction::Command(Command::Move(Direction::Left)),

        // WASD keys
        [b'w'] | [b'W'] => InputAction::Command(Command::Move(Direction::Up)),
        [b's'] | [b'S'] => InputAction::Command(Command::Move(Direction::Down)),
        [b'a'] | [b'A'] => InputAction::Command(Command::Move(Direction::Left)),
        [b'd'] | [b'D'] => InputAction::Command(Command::Move(Direction::Right)),

        // Control keys
        [b'r'] | [b'R'] => InputAction::Command(Command::Restart),
        [b'k'] | [b'K'] => InputAction::Command(Command::KeepPlaying),
        [b'q'] | [b'Q'] | [3] | [27] => InputAction::Quit, // q, Q, Ctrl+C, Esc

        _ => InputAction::None,
    }
}

/// Lay tile views out as rows of values, 0 for empty cells.
pub fn board_rows(size: usize, tiles: &[TileView]) -> Vec<Vec<u32>> {
    let mut rows = vec![vec![0; size]; size];
    for tile in tiles {
        if tile.x < size && tile.y < size {
            rows[tile.y][tile.x] = tile.value;
        }
    }
    rows
}

pub fn format_board(size: usize, tiles: &[TileView]) -> String {
    let border = "+------".repeat(size) + "+\n";
    let mut out = border.clone();
    for (y, row) in board_rows(size, tiles).iter().enumerate() {
        out.push('|');
        for (x, &value) in row.iter().enumerate() {
            let fresh = tiles
                .iter()
                .any(|t| t.x == x && t.y == y && (t.is_new || t.is_merged));
            if value == 0 {
                out.push_str("      |");
            } else if fresh {
                out.push_str(&format!("{:^6}|", format!("{}*", value)));
            } else {
                out.push_str(&format!("{:^6}|", value));
            }
        }
        out.push('\n');
        out.push_str(&border);
    }
    out
}

/// Redraws the whole screen on every state change.
pub struct TerminalRender {
    size: usize,
    clear_screen: bool,
}

impl TerminalRender {
    pub fn new(size: usize, clear_screen: bool) -> Self {
        TerminalRender { size, clear_screen }
    }
}

impl RenderHook for TerminalRender {
    fn on_state_change(&mut self, tiles: &[TileView]) {
        let mut out = io::stdout();
        if self.clear_screen {
            let _ = write!(out, "\x1b[2J\x1b[H");
            let _ = writeln!(out, "=== 2048 ===");
            let _ = writeln!(out, "{}\n", CONTROLS);
        }
        let _ = write!(out, "{}", format_board(self.size, tiles));
        let _ = out.flush();
    }
}

// Platform-specific terminal raw mode handling
#[cfg(unix)]
pub fn enable_raw_mode() {
    use std::os::unix::io::AsRawFd;
    unsafe {
        let fd = io::stdin().as_raw_fd();
        let mut termios: libc::termios = std::mem::zeroed();
        libc::tcgetattr(fd, &mut termios);
        termios.c_lflag &= !(libc::ICANON | libc::ECHO);
        termios.c_cc[libc::VMIN] = 1;
        termios.c_cc[libc::VTIME] = 0;
        libc::tcsetattr(fd, libc::TCSANOW, &termios);
    }
}

#[cfg(unix)]
pub fn disable_raw_mode() {
    use std::os::unix::io::AsRawFd;
    unsafe {
        let fd = io::stdin().as_raw_fd();
        let mut termios: libc::termios = std::mem::zeroed();
        libc::tcgetattr(fd, &mut termios);
        termios.c_lflag |= libc::ICANON | libc::ECHO;
        libc::tcsetattr(fd, libc::TCSANOW, &termios);
    }
}

#[cfg(not(unix))]
pub fn enable_raw_mode() {
    // Without termios every key needs Enter.
}

#[cfg(not(unix))]
pub fn disable_raw_mode() {}

#[cfg(test)]
mod tests {
    use super::*;
    use merge_2048_core::TileId;

    fn view(x: usize, y: usize, value: u32) -> TileView {
        TileView {
            id: TileId(0),
            value,
            x,
            y,
            previous: None,
            is_new: false,
            is_merged: false,
        }
    }

    #[test]
    fn test_parse_arrows_and_wasd() {
        assert!(matches!(
            parse_input(&[27, 91, 68]),
            InputAction::Command(Command::Move(Direction::Left))
        ));
        assert!(matches!(
            parse_input(b"w"),
            InputAction::Command(Command::Move(Direction::Up))
        ));
        assert!(matches!(parse_input(b"k"), InputAction::Command(Command::KeepPlaying)));
        assert!(matches!(parse_input(b"q"), InputAction::Quit));
        assert!(matches!(parse_input(b"x"), InputAction::None));
    }

    #[test]
    fn test_board_rows_places_by_xy() {
        let rows = board_rows(3, &[view(2, 0, 8), view(0, 1, 2)]);
        assert_eq!(rows, vec![vec![0, 0, 8], vec![2, 0, 0], vec![0, 0, 0]]);
    }

    #[test]
    fn test_format_board_marks_fresh_tiles() {
        let mut fresh = view(0, 0, 4);
        fresh.is_new = true;
        let text = format_board(2, &[fresh, view(1, 1, 16)]);
        assert!(text.contains("4*"));
        assert!(text.contains("16"));
        assert!(!text.contains("16*"));
        assert!(text.starts_with("+------+------+"));
    }
}
