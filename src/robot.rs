use std::collections::HashMap;

use log::debug;

use crate::error::{Error, Result};
use crate::explore::{Pos, bounds};
use crate::machine::{Machine, State};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Colour {
    Black,
    White,
}

impl Colour {
    fn code(self) -> i64 {
        match self {
            Colour::Black => 0,
            Colour::White => 1,
        }
    }

    fn from_code(code: i64) -> Result<Self> {
        match code {
            0 => Ok(Colour::Black),
            1 => Ok(Colour::White),
            other => Err(Error::Protocol(format!("unknown paint colour {other}"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Heading {
    North,
    East,
    South,
    West,
}

impl Heading {
    fn left(self) -> Self {
        match self {
            Heading::North => Heading::West,
            Heading::West => Heading::South,
            Heading::South => Heading::East,
            Heading::East => Heading::North,
        }
    }

    fn right(self) -> Self {
        self.left().left().left()
    }

    fn advance(self, (x, y): Pos) -> Pos {
        match self {
            Heading::North => (x, y + 1),
            Heading::East => (x + 1, y),
            Heading::South => (x, y - 1),
            Heading::West => (x - 1, y),
        }
    }
}

/// Hull painting robot.
///
/// Each cycle the robot feeds the colour of the panel under it to the
/// program, which answers with a colour to paint (0 black, 1 white) and a
/// turn (0 left, 1 right). The robot paints, turns and moves one panel
/// forward. Unpainted panels are black.
#[derive(Debug, Clone)]
pub struct Robot {
    machine: Machine,
    hull: HashMap<Pos, Colour>,
    position: Pos,
    heading: Heading,
}

impl Robot {
    pub fn new(machine: Machine) -> Self {
        Self {
            machine,
            hull: HashMap::new(),
            position: (0, 0),
            heading: Heading::North,
        }
    }

    /// Paint the starting panel before the robot begins.
    pub fn starting_on(mut self, colour: Colour) -> Self {
        self.hull.insert((0, 0), colour);
        self
    }

    pub fn colour(&self, pos: Pos) -> Colour {
        self.hull.get(&pos).copied().unwrap_or(Colour::Black)
    }

    pub fn position(&self) -> Pos {
        self.position
    }

    /// Run the program until it halts.
    pub fn run(&mut self) -> Result<()> {
        loop {
            let state = self.machine.resume([self.colour(self.position).code()])?;
            let output = self.machine.drain_output();
            let commands = output.chunks_exact(2);
            if !commands.remainder().is_empty() {
                return Err(Error::Protocol("paint command without a turn".into()));
            }
            for command in commands {
                self.paint_and_move(command[0], command[1])?;
            }
            if state == State::Halted {
                break;
            }
        }
        debug!("robot painted {} panels", self.hull.len());
        Ok(())
    }

    /// Number of panels painted at least once.
    pub fn painted(&self) -> usize {
        self.hull.len()
    }

    /// Render the painted area, north at the top: `#` white, `.` black.
    pub fn render(&self) -> String {
        if self.hull.is_empty() {
            return String::new();
        }
        let (min_x, max_x, min_y, max_y) = bounds(self.hull.keys());
        let mut out = String::new();
        for y in (min_y..=max_y).rev() {
            out.extend((min_x..=max_x).map(|x| match self.colour((x, y)) {
                Colour::White => '#',
                Colour::Black => '.',
            }));
            out.push('\n');
        }
        out
    }

    fn paint_and_move(&mut self, colour: i64, turn: i64) -> Result<()> {
        self.hull.insert(self.position, Colour::from_code(colour)?);
        self.heading = match turn {
            0 => self.heading.left(),
            1 => self.heading.right(),
            other => return Err(Error::Protocol(format!("unknown turn {other}"))),
        };
        self.position = self.heading.advance(self.position);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Paints white and turns left four times, then halts.
    fn square_painter() -> Vec<i64> {
        vec![
            3, 15, // read colour
            104, 1, 104, 0, // paint white, turn left
            1001, 14, -1, 14, 1005, 14, 0, // loop while --n != 0
            99, 4, 0,
        ]
    }

    /// Paints the opposite of what it sees and turns right, six times.
    fn inverter() -> Vec<i64> {
        vec![
            3, 20, // read colour
            1008, 20, 0, 21, // 21 = colour == black
            4, 21, 104, 1, // paint it, turn right
            1001, 19, -1, 19, 1005, 19, 0, // loop while --n != 0
            99, 0, 6, 0, 0,
        ]
    }

    #[test]
    fn test_square_painter() {
        let mut robot = Robot::new(Machine::new(square_painter()));
        robot.run().unwrap();
        assert_eq!(robot.painted(), 4);
        assert_eq!(robot.position(), (0, 0));
        assert_eq!(robot.render(), "##\n##\n");
    }

    #[test]
    fn test_inverter_repaints_visited_panels() {
        let mut robot = Robot::new(Machine::new(inverter()));
        robot.run().unwrap();
        // Turning right four times walks a 2x2 loop; the fifth and sixth
        // cycles repaint (0, 0) and (1, 0) back to black.
        assert_eq!(robot.painted(), 4);
        assert_eq!(robot.colour((0, 0)), Colour::Black);
        assert_eq!(robot.colour((1, 0)), Colour::Black);
        assert_eq!(robot.colour((1, -1)), Colour::White);
        assert_eq!(robot.colour((0, -1)), Colour::White);
        assert_eq!(robot.position(), (1, -1));
    }

    #[test]
    fn test_starting_on_white() {
        let mut robot = Robot::new(Machine::new(inverter())).starting_on(Colour::White);
        robot.run().unwrap();
        assert_eq!(robot.colour((0, 0)), Colour::White);
    }

    #[test]
    fn test_turns() {
        assert_eq!(Heading::North.right(), Heading::East);
        assert_eq!(Heading::East.right(), Heading::South);
        assert_eq!(Heading::North.left(), Heading::West);
        assert_eq!(Heading::North.left().right(), Heading::North);
    }

    #[test]
    fn test_bad_turn_is_rejected() {
        let mut robot = Robot::new(Machine::new(vec![3, 0, 104, 1, 104, 5, 99]));
        assert!(matches!(robot.run(), Err(Error::Protocol(_))));
    }

    #[test]
    fn test_half_command_is_rejected() {
        let mut robot = Robot::new(Machine::new(vec![3, 0, 104, 1, 99]));
        assert!(matches!(robot.run(), Err(Error::Protocol(_))));
    }
}
