//! Relative cursor movement and clearing primitives.
//!
//! Commands are queued, not flushed; callers flush once per repaint. A zero
//! move emits nothing (terminals read `CSI 0 A` as a move of one).

use std::io::{self, Write};

use crossterm::cursor::{Hide, MoveDown, MoveLeft, MoveRight, MoveUp, Show};
use crossterm::terminal::{Clear, ClearType};
use crossterm::QueueableCommand;

fn steps(n: i64) -> u16 {
    u16::try_from(n.unsigned_abs()).unwrap_or(u16::MAX)
}

/// Move the cursor `dx` columns right (negative: left) and `dy` rows down
/// (negative: up).
pub fn move_cursor<W: Write + ?Sized>(out: &mut W, dx: i64, dy: i64) -> io::Result<()> {
    if dx < 0 {
        out.queue(MoveLeft(steps(dx)))?;
    } else if dx > 0 {
        out.queue(MoveRight(steps(dx)))?;
    }
    if dy < 0 {
        out.queue(MoveUp(steps(dy)))?;
    } else if dy > 0 {
        out.queue(MoveDown(steps(dy)))?;
    }
    Ok(())
}

/// Clear from the cursor to the end of the current line.
pub fn clear_line_right<W: Write + ?Sized>(out: &mut W) -> io::Result<()> {
    out.queue(Clear(ClearType::UntilNewLine))?;
    Ok(())
}

/// Clear from the cursor to the end of the screen.
pub fn clear_screen_down<W: Write + ?Sized>(out: &mut W) -> io::Result<()> {
    out.queue(Clear(ClearType::FromCursorDown))?;
    Ok(())
}

pub fn hide_cursor<W: Write + ?Sized>(out: &mut W) -> io::Result<()> {
    out.queue(Hide)?;
    Ok(())
}

pub fn show_cursor<W: Write + ?Sized>(out: &mut W) -> io::Result<()> {
    out.queue(Show)?;
    Ok(())
}
