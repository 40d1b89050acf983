use std::collections::BTreeMap;

use crate::error::{Error, Result};

/// Writes this far past the dense region go to the sparse map instead of
/// growing the vector.
const DENSE_SLACK: usize = 1 << 16;

/// Growable, zero-indexed integer memory.
///
/// Cells are `i64`. Reads beyond the current extent yield 0; writes beyond it
/// zero-fill the tape up to and including the written address. Negative
/// addresses are always rejected.
///
/// Addresses near the end of the tape live in a contiguous vector. A write far
/// beyond it is kept in a sparse map, so a program touching address `2^40`
/// costs one entry rather than terabytes of zeros.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tape {
    cells: Vec<i64>,
    sparse: BTreeMap<usize, i64>,
}

impl Tape {
    pub fn new(cells: Vec<i64>) -> Self {
        Self {
            cells,
            sparse: BTreeMap::new(),
        }
    }

    pub fn get(&self, address: i64) -> Result<i64> {
        let idx = index(address)?;
        Ok(match self.cells.get(idx) {
            Some(&cell) => cell,
            None => self.sparse.get(&idx).copied().unwrap_or(0),
        })
    }

    pub fn set(&mut self, address: i64, value: i64) -> Result<()> {
        let idx = index(address)?;
        if idx < self.cells.len() {
            self.cells[idx] = value;
        } else if idx - self.cells.len() < DENSE_SLACK {
            self.grow(idx + 1);
            self.cells[idx] = value;
        } else {
            self.sparse.insert(idx, value);
        }
        Ok(())
    }

    /// One past the highest address ever written or loaded.
    pub fn len(&self) -> usize {
        match self.sparse.last_key_value() {
            Some((&idx, _)) => idx + 1,
            None => self.cells.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty() && self.sparse.is_empty()
    }

    /// The contiguous low region of the tape. Far writes are in
    /// [`sparse_cells`](Tape::sparse_cells).
    pub fn as_slice(&self) -> &[i64] {
        &self.cells
    }

    /// Cells written far beyond the contiguous region, by ascending address.
    pub fn sparse_cells(&self) -> impl Iterator<Item = (usize, i64)> + '_ {
        self.sparse.iter().map(|(&idx, &cell)| (idx, cell))
    }

    /// Extend the dense region to `new_len`, pulling in sparse cells it now covers.
    fn grow(&mut self, new_len: usize) {
        self.cells.resize(new_len, 0);
        let far = self.sparse.split_off(&new_len);
        for (idx, cell) in std::mem::replace(&mut self.sparse, far) {
            self.cells[idx] = cell;
        }
    }
}

impl From<Vec<i64>> for Tape {
    fn from(cells: Vec<i64>) -> Self {
        Self::new(cells)
    }
}

impl From<&[i64]> for Tape {
    fn from(cells: &[i64]) -> Self {
        Self::new(cells.to_vec())
    }
}

fn index(address: i64) -> Result<usize> {
    usize::try_from(address).map_err(|_| Error::InvalidAddress(address))
}
