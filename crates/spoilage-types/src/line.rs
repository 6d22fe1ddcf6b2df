//! Parsing of text lines emitted by the sensor board.
//!
//! The firmware is free to print whatever it wants; only lines that carry all
//! four values are turned into [`SensorValues`]. Two shapes are understood:
//!
//! - positional: `22.5,40,310,420` (comma, semicolon or whitespace separated)
//! - keyed: `temperature=22.5 humidity=40 light=310 gas=420` (`=` or `:`,
//!   with or without spaces around the separator)
//!
//! # Example
//!
//! ```
//! use spoilage_types::parse_sensor_line;
//!
//! let v = parse_sensor_line("T:22.5, H:40, L:310, G:420").unwrap();
//! assert_eq!(v.gas_level, 420.0);
//! assert!(parse_sensor_line("booting...").is_err());
//! ```

use crate::error::{ParseError, ParseResult};
use crate::types::{SensorValues, parse_value};

const FIELDS: [&str; 4] = ["temperature", "humidity", "light", "gas_level"];

/// Parse a serial line into sensor values.
pub fn parse_sensor_line(line: &str) -> ParseResult<SensorValues> {
    let line = join_separators(line);
    let tokens: Vec<&str> = line
        .split(|c: char| c == ',' || c == ';' || c.is_whitespace())
        .filter(|t| !t.is_empty())
        .collect();

    if tokens.iter().any(|t| t.contains('=')) {
        parse_keyed(&tokens)
    } else {
        parse_positional(&tokens)
    }
}

/// Rewrite every `:` or `=` with its surrounding whitespace as a bare `=`,
/// so `Temp: 22.5` and `temp = 22.5` tokenize like `temp=22.5`.
fn join_separators(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '=' || c == ':' {
            out.truncate(out.trim_end().len());
            out.push('=');
            while chars.next_if(|c| c.is_whitespace()).is_some() {}
        } else {
            out.push(c);
        }
    }

    out
}

fn parse_positional(tokens: &[&str]) -> ParseResult<SensorValues> {
    if tokens.len() < FIELDS.len() {
        return Err(ParseError::MissingField(FIELDS[tokens.len()]));
    }
    SensorValues::parse(tokens[0], tokens[1], tokens[2], tokens[3])
}

fn parse_keyed(tokens: &[&str]) -> ParseResult<SensorValues> {
    let mut slots: [Option<f64>; 4] = [None; 4];

    for token in tokens {
        let Some((key, value)) = token.split_once('=') else {
            continue;
        };
        let Some(index) = field_index(key) else {
            continue;
        };
        slots[index] = Some(parse_value(FIELDS[index], value)?);
    }

    let get = |i: usize| slots[i].ok_or(ParseError::MissingField(FIELDS[i]));
    Ok(SensorValues::new(get(0)?, get(1)?, get(2)?, get(3)?))
}

fn field_index(key: &str) -> Option<usize> {
    match key.trim().to_ascii_lowercase().as_str() {
        "temperature" | "temp" | "t" => Some(0),
        "humidity" | "hum" | "h" => Some(1),
        "light" | "lux" | "l" => Some(2),
        "gas_level" | "gas" | "g" => Some(3),
        _ => None,
    }
}
