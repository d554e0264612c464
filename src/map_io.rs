//! Loading and saving [OccupancyMap]s as text.
//!
//! ```text
//! size 4
//! start 0 0
//! end 3 3
//! map
//! S...
//! .@@.
//! ....
//! ...G
//! ```
//! `.`, `S` and `G` are passable, every other character is blocked. The header decides where
//! the endpoints are; the `S`/`G` markers are written for readability only.

use std::fs;
use std::path::Path;

use log::info;

use crate::error::{Error, Result};
use crate::occupancy::OccupancyMap;
use crate::position::Position;

const PASSABLE: [u8; 3] = [b'.', b'S', b'G'];

/// Largest side length a map file may declare.
pub const MAX_SIZE: usize = 4096;

fn header<'a>(
    lines: &mut impl Iterator<Item = (usize, &'a str)>,
    key: &str,
) -> Result<(usize, &'a str)> {
    let (ix, line) = lines
        .next()
        .ok_or_else(|| Error::parse(0, format!("missing `{key}` line")))?;
    match line.trim().split_once(' ') {
        Some((k, value)) if k == key => Ok((ix, value.trim())),
        _ => Err(Error::parse(ix + 1, format!("expected `{key} ...`, found `{line}`"))),
    }
}

fn parse_position(line: usize, value: &str) -> Result<Position> {
    let mut parts = value.split_whitespace().map(|v| {
        v.parse::<i32>()
            .map_err(|e| Error::parse(line, format!("invalid coordinate `{v}`: {e}")))
    });
    match (parts.next(), parts.next(), parts.next()) {
        (Some(x), Some(y), None) => Ok(Position::new(x?, y?)),
        _ => Err(Error::parse(line, "expected two coordinates")),
    }
}

pub fn parse_map(text: &str) -> Result<OccupancyMap> {
    let mut lines = text
        .lines()
        .enumerate()
        .filter(|(_, l)| !l.trim().is_empty());

    let (ix, value) = header(&mut lines, "size")?;
    let size = value
        .parse::<usize>()
        .map_err(|e| Error::parse(ix + 1, format!("invalid size `{value}`: {e}")))?;
    if size > MAX_SIZE {
        return Err(Error::parse(
            ix + 1,
            format!("size {size} exceeds the maximum of {MAX_SIZE}"),
        ));
    }
    let (ix, value) = header(&mut lines, "start")?;
    let start = parse_position(ix + 1, value)?;
    let (ix, value) = header(&mut lines, "end")?;
    let end = parse_position(ix + 1, value)?;
    match lines.next() {
        Some((_, l)) if l.trim() == "map" => {}
        Some((ix, l)) => return Err(Error::parse(ix + 1, format!("expected `map`, found `{l}`"))),
        None => return Err(Error::parse(0, "missing `map` line")),
    }

    let mut map = OccupancyMap::new(size, start, end);
    for x in 0..size {
        let (ix, row) = lines
            .next()
            .ok_or_else(|| Error::parse(0, format!("expected {size} rows, found {x}")))?;
        let row = row.trim().as_bytes();
        if row.len() != size {
            return Err(Error::parse(
                ix + 1,
                format!("expected {size} cells, found {}", row.len()),
            ));
        }
        for (y, tile) in row.iter().enumerate() {
            map.set_blocked(Position::new(x as i32, y as i32), !PASSABLE.contains(tile))?;
        }
    }
    if let Some((ix, _)) = lines.next() {
        return Err(Error::parse(ix + 1, "unexpected content after the last row"));
    }
    Ok(map)
}

pub fn format_map(map: &OccupancyMap) -> String {
    let mut out = format!(
        "size {}\nstart {} {}\nend {} {}\nmap\n",
        map.size(),
        map.start().x,
        map.start().y,
        map.end().x,
        map.end().y
    );
    for x in 0..map.size() as i32 {
        for y in 0..map.size() as i32 {
            let p = Position::new(x, y);
            out.push(if p == map.start() {
                'S'
            } else if p == map.end() {
                'G'
            } else if map.is_blocked(p) {
                '@'
            } else {
                '.'
            });
        }
        out.push('\n');
    }
    out
}

pub fn load_map(path: impl AsRef<Path>) -> Result<OccupancyMap> {
    let path = path.as_ref();
    info!("Loading map from {}", path.display());
    parse_map(&fs::read_to_string(path)?)
}

pub fn save_map(path: impl AsRef<Path>, map: &OccupancyMap) -> Result<()> {
    let path = path.as_ref();
    info!("Saving map to {}", path.display());
    fs::write(path, format_map(map))?;
    Ok(())
}
