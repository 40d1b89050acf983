use log::debug;
use rayon::prelude::*;

use crate::error::{Error, Result};
use crate::machine::Machine;

/// How far right of the previous row's edge to look for the beam before
/// deciding a row is empty.
const EDGE_SEARCH: i64 = 64;

/// Deploy a drone at `(x, y)` on a fresh machine and report whether it is
/// being pulled. The program reads `x` then `y` and writes 0 or 1.
pub fn probe(image: &[i64], x: i64, y: i64) -> Result<bool> {
    let mut machine = Machine::new(image.to_vec());
    machine.run([x, y])?;
    match machine.last_output() {
        Some(0) => Ok(false),
        Some(1) => Ok(true),
        Some(other) => Err(Error::Protocol(format!("probe at ({x}, {y}) answered {other}"))),
        None => Err(Error::Protocol(format!("probe at ({x}, {y}) gave no answer"))),
    }
}

/// Probe every point of a `width × height` grid. Rows are scanned in
/// parallel; each point gets its own machine.
///
/// The result is indexed `[y][x]`.
pub fn scan(image: &[i64], width: usize, height: usize) -> Result<Vec<Vec<bool>>> {
    (0..height)
        .into_par_iter()
        .map(|y| {
            (0..width)
                .map(|x| probe(image, x as i64, y as i64))
                .collect::<Result<Vec<bool>>>()
        })
        .collect()
}

/// Number of pulled points in a scan.
pub fn pulled(grid: &[Vec<bool>]) -> usize {
    grid.iter().flatten().filter(|&&p| p).count()
}

/// Render a scan with `#` for pulled points and `.` elsewhere.
pub fn render(grid: &[Vec<bool>]) -> String {
    let mut out = String::new();
    for row in grid {
        out.extend(row.iter().map(|&p| if p { '#' } else { '.' }));
        out.push('\n');
    }
    out
}

/// Find the top-left corner of the first `size × size` square that fits
/// entirely inside the beam, searching at most `max_rows` rows.
///
/// Walks the lower-left edge of the beam row by row; for each row the square
/// whose bottom-left corner sits on the edge fits exactly when its top-right
/// corner is pulled too. Assumes the beam's left edge never moves left as `y`
/// grows.
pub fn fit_square(image: &[i64], size: i64, max_rows: i64) -> Result<Option<(i64, i64)>> {
    if size <= 0 {
        return Ok(None);
    }
    let mut edge = 0;
    for y in (size - 1)..max_rows {
        let Some(x) = left_edge(image, edge, y)? else {
            continue;
        };
        edge = x;
        let top = y - (size - 1);
        if probe(image, x + size - 1, top)? {
            debug!("{size}x{size} square fits at ({x}, {top})");
            return Ok(Some((x, top)));
        }
    }
    Ok(None)
}

fn left_edge(image: &[i64], from: i64, y: i64) -> Result<Option<i64>> {
    for x in from..from + EDGE_SEARCH {
        if probe(image, x, y)? {
            return Ok(Some(x));
        }
    }
    Ok(None)
}
