use std::collections::{HashMap, VecDeque};

use log::debug;

use crate::error::{Error, Result};
use crate::machine::{Machine, State};

/// Droid movement commands.
pub const NORTH: i64 = 1;
pub const SOUTH: i64 = 2;
pub const WEST: i64 = 3;
pub const EAST: i64 = 4;

/// Droid status replies.
const HIT_WALL: i64 = 0;
const MOVED: i64 = 1;
const MOVED_TO_TARGET: i64 = 2;

pub type Pos = (i64, i64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    Open,
    Wall,
    Target,
}

fn neighbour((x, y): Pos, command: i64) -> Pos {
    match command {
        NORTH => (x, y + 1),
        SOUTH => (x, y - 1),
        WEST => (x - 1, y),
        _ => (x + 1, y),
    }
}

/// The target cell, how far it is from the start, and a droid standing on it.
#[derive(Debug, Clone)]
pub struct Found {
    pub position: Pos,
    pub distance: usize,
    pub machine: Machine,
}

/// Everything learned by walking a droid program over its whole map.
#[derive(Debug, Clone)]
pub struct Exploration {
    pub map: HashMap<Pos, Cell>,
    pub target: Option<Found>,
}

/// Map out a droid program by breadth-first search.
///
/// Every frontier droid is forked once per unexplored neighbour and each fork
/// is sent one step in its direction. Forks that hit a wall are dropped; the
/// rest join the next frontier. Because the search is breadth-first, the first
/// fork to report the target has taken the shortest path.
///
/// The machine is not modified; exploration starts from a fork of it.
pub fn explore(machine: &Machine) -> Result<Exploration> {
    let mut start = machine.fork();
    start.clear_output();
    if start.run([])? == State::Halted {
        return Err(Error::Protocol("droid halted before its first move".into()));
    }

    let mut map = HashMap::from([((0, 0), Cell::Open)]);
    let mut target = None;
    let mut frontier = VecDeque::from([((0, 0), 0usize, start)]);

    while let Some((pos, distance, droid)) = frontier.pop_front() {
        for command in [NORTH, SOUTH, WEST, EAST] {
            let next = neighbour(pos, command);
            if map.contains_key(&next) {
                continue;
            }
            let mut fork = droid.fork();
            let state = fork.resume([command])?;
            let status = fork
                .drain_output()
                .last()
                .copied()
                .ok_or_else(|| Error::Protocol(format!("no status after move {command} from {pos:?}")))?;
            let cell = match status {
                HIT_WALL => Cell::Wall,
                MOVED => Cell::Open,
                MOVED_TO_TARGET => Cell::Target,
                other => return Err(Error::Protocol(format!("unknown droid status {other}"))),
            };
            map.insert(next, cell);
            if cell == Cell::Target && target.is_none() {
                debug!("target found at {next:?} after {} moves", distance + 1);
                target = Some(Found {
                    position: next,
                    distance: distance + 1,
                    machine: fork.clone(),
                });
            }
            if cell != Cell::Wall && state != State::Halted {
                frontier.push_back((next, distance + 1, fork));
            }
        }
    }

    debug!("explored {} cells", map.len());
    Ok(Exploration { map, target })
}

impl Exploration {
    /// Number of steps needed to reach every open cell when spreading one cell
    /// per step from the target. `None` when no target was found.
    pub fn fill_time(&self) -> Option<usize> {
        let origin = self.target.as_ref()?.position;
        let mut seen = HashMap::from([(origin, 0usize)]);
        let mut queue = VecDeque::from([origin]);
        let mut longest = 0;
        while let Some(pos) = queue.pop_front() {
            let d = seen[&pos];
            longest = longest.max(d);
            for command in [NORTH, SOUTH, WEST, EAST] {
                let next = neighbour(pos, command);
                let open = matches!(self.map.get(&next), Some(Cell::Open | Cell::Target));
                if open && !seen.contains_key(&next) {
                    seen.insert(next, d + 1);
                    queue.push_back(next);
                }
            }
        }
        Some(longest)
    }

    /// Render the map, north at the top. `D` is the start, `X` the target.
    pub fn render(&self) -> String {
        if self.map.is_empty() {
            return String::new();
        }
        let (min_x, max_x, min_y, max_y) = bounds(self.map.keys());
        let mut out = String::new();
        for y in (min_y..=max_y).rev() {
            for x in min_x..=max_x {
                let ch = match self.map.get(&(x, y)) {
                    _ if (x, y) == (0, 0) => 'D',
                    Some(Cell::Open) => '.',
                    Some(Cell::Wall) => '#',
                    Some(Cell::Target) => 'X',
                    None => ' ',
                };
                out.push(ch);
            }
            out.push('\n');
        }
        out
    }
}

pub(crate) fn bounds<'a>(points: impl Iterator<Item = &'a Pos>) -> (i64, i64, i64, i64) {
    points.fold(
        (i64::MAX, i64::MIN, i64::MAX, i64::MIN),
        |(lx, hx, ly, hy), &(x, y)| (lx.min(x), hx.max(x), ly.min(y), hy.max(y)),
    )
}
