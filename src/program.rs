use std::path::Path;

use crate::error::{Error, Result};

/// Parse a comma-separated program image such as `"1,0,0,3,99"`.
///
/// Whitespace around cells is ignored, as is a single trailing comma.
pub fn parse(text: &str) -> Result<Vec<i64>> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(Vec::new());
    }
    let text = text.strip_suffix(',').unwrap_or(text);
    text.split(',')
        .enumerate()
        .map(|(index, token)| {
            let token = token.trim();
            token.parse::<i64>().map_err(|_| Error::Parse {
                index,
                token: token.to_string(),
            })
        })
        .collect()
}

/// Read and parse a program image from a file.
pub fn load(path: impl AsRef<Path>) -> Result<Vec<i64>> {
    let text = std::fs::read_to_string(path)?;
    parse(&text)
}

/// Parse a list of input values (`"1,2,-3"`). Same syntax as a program image.
pub fn parse_inputs(text: &str) -> Result<Vec<i64>> {
    parse(text)
}
