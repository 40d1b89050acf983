use std::collections::HashMap;

use log::debug;

use crate::error::{Error, Result};
use crate::explore::{Pos, bounds};
use crate::machine::{Machine, State};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tile {
    Empty,
    Wall,
    Block,
    Paddle,
    Ball,
}

impl Tile {
    fn from_id(id: i64) -> Result<Self> {
        match id {
            0 => Ok(Tile::Empty),
            1 => Ok(Tile::Wall),
            2 => Ok(Tile::Block),
            3 => Ok(Tile::Paddle),
            4 => Ok(Tile::Ball),
            other => Err(Error::Protocol(format!("unknown tile id {other}"))),
        }
    }

    fn glyph(self) -> char {
        match self {
            Tile::Empty => ' ',
            Tile::Wall => '#',
            Tile::Block => '=',
            Tile::Paddle => '-',
            Tile::Ball => 'o',
        }
    }
}

/// A breakout-style game driven by an Intcode cabinet.
///
/// The program draws by writing `(x, y, tile)` triples; the triple
/// `(-1, 0, n)` sets the score instead. Each frame the program reads one
/// joystick tilt: -1 left, 0 neutral, 1 right.
#[derive(Debug, Clone)]
pub struct Arcade {
    machine: Machine,
    screen: HashMap<Pos, Tile>,
    score: i64,
    ball: Option<Pos>,
    paddle: Option<Pos>,
}

impl Arcade {
    pub fn new(machine: Machine) -> Self {
        Self {
            machine,
            screen: HashMap::new(),
            score: 0,
            ball: None,
            paddle: None,
        }
    }

    /// Run the cabinet up to its first joystick read and draw the screen.
    pub fn boot(&mut self) -> Result<State> {
        let state = self.machine.run([])?;
        self.draw()?;
        Ok(state)
    }

    /// Advance one frame with the given joystick tilt.
    pub fn frame(&mut self, joystick: i64) -> Result<State> {
        let state = self.machine.resume([joystick])?;
        self.draw()?;
        Ok(state)
    }

    /// Play until the program halts, keeping the paddle under the ball.
    /// Returns the final score.
    pub fn play(&mut self) -> Result<i64> {
        let mut frames = 0usize;
        let mut state = self.boot()?;
        while state != State::Halted {
            state = self.frame(self.tilt())?;
            frames += 1;
        }
        debug!("game over after {frames} frames, score {}", self.score);
        Ok(self.score)
    }

    /// Joystick tilt that moves the paddle towards the ball.
    pub fn tilt(&self) -> i64 {
        match (self.ball, self.paddle) {
            (Some((bx, _)), Some((px, _))) => (bx - px).signum(),
            _ => 0,
        }
    }

    pub fn score(&self) -> i64 {
        self.score
    }

    pub fn ball(&self) -> Option<Pos> {
        self.ball
    }

    pub fn paddle(&self) -> Option<Pos> {
        self.paddle
    }

    pub fn tile(&self, pos: Pos) -> Tile {
        self.screen.get(&pos).copied().unwrap_or(Tile::Empty)
    }

    /// Number of blocks still on screen.
    pub fn blocks(&self) -> usize {
        self.screen.values().filter(|&&t| t == Tile::Block).count()
    }

    pub fn render(&self) -> String {
        if self.screen.is_empty() {
            return String::new();
        }
        let (min_x, max_x, min_y, max_y) = bounds(self.screen.keys());
        let mut out = String::new();
        for y in min_y..=max_y {
            out.extend((min_x..=max_x).map(|x| self.tile((x, y)).glyph()));
            out.push('\n');
        }
        out
    }

    fn draw(&mut self) -> Result<()> {
        let output = self.machine.drain_output();
        let records = output.chunks_exact(3);
        if !records.remainder().is_empty() {
            return Err(Error::Protocol(format!(
                "{} trailing values after the last tile record",
                records.remainder().len()
            )));
        }
        for record in records {
            let (x, y, value) = (record[0], record[1], record[2]);
            if (x, y) == (-1, 0) {
                self.score = value;
                continue;
            }
            let tile = Tile::from_id(value)?;
            match tile {
                Tile::Ball => self.ball = Some((x, y)),
                Tile::Paddle => self.paddle = Some((x, y)),
                _ => {}
            }
            self.screen.insert((x, y), tile);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Draws a wall, a block, the paddle and the ball, reads one tilt, scores
    /// `10 + tilt`, clears the block and halts.
    fn cabinet() -> Vec<i64> {
        vec![
            104, 0, 104, 0, 104, 1, // wall at (0, 0)
            104, 1, 104, 0, 104, 2, // block at (1, 0)
            104, 2, 104, 0, 104, 3, // paddle at (2, 0)
            104, 3, 104, 1, 104, 4, // ball at (3, 1)
            3, 100, // joystick
            1001, 100, 10, 101, // score = tilt + 10
            104, -1, 104, 0, 4, 101, // report score
            104, 1, 104, 0, 104, 0, // clear block
            99,
        ]
    }

    #[test]
    fn test_boot_draws_screen() {
        let mut arcade = Arcade::new(Machine::new(cabinet()));
        assert_eq!(arcade.boot().unwrap(), State::AwaitingInput);
        assert_eq!(arcade.tile((0, 0)), Tile::Wall);
        assert_eq!(arcade.tile((1, 0)), Tile::Block);
        assert_eq!(arcade.blocks(), 1);
        assert_eq!(arcade.paddle(), Some((2, 0)));
        assert_eq!(arcade.ball(), Some((3, 1)));
        assert_eq!(arcade.tilt(), 1);
        assert_eq!(arcade.render(), "#=- \n   o\n");
    }

    #[test]
    fn test_frame_updates_score_and_blocks() {
        let mut arcade = Arcade::new(Machine::new(cabinet()));
        arcade.boot().unwrap();
        assert_eq!(arcade.frame(-1).unwrap(), State::Halted);
        assert_eq!(arcade.score(), 9);
        assert_eq!(arcade.blocks(), 0);
        assert_eq!(arcade.tile((1, 0)), Tile::Empty);
    }

    #[test]
    fn test_play_follows_ball() {
        let mut arcade = Arcade::new(Machine::new(cabinet()));
        assert_eq!(arcade.play().unwrap(), 11);
    }

    #[test]
    fn test_tilt_without_ball_is_neutral() {
        let arcade = Arcade::new(Machine::new(vec![99]));
        assert_eq!(arcade.tilt(), 0);
    }

    #[test]
    fn test_incomplete_record_is_rejected() {
        let mut arcade = Arcade::new(Machine::new(vec![104, 1, 104, 2, 99]));
        assert!(matches!(arcade.boot(), Err(Error::Protocol(_))));
    }

    #[test]
    fn test_unknown_tile_is_rejected() {
        let mut arcade = Arcade::new(Machine::new(vec![104, 1, 104, 2, 104, 9, 99]));
        assert!(matches!(arcade.boot(), Err(Error::Protocol(_))));
    }
}
