//! Shared G-code heater parsing utilities

use crate::HeaterRole;

/// Map a raw G-code line to the heater it sets, if any.
///
/// Only the line prefix is inspected: `M104`/`M109` set the nozzle,
/// `M140`/`M190` the bed and `M141`/`M191` the chamber.
pub fn classify_heater_line(line: &str) -> Option<HeaterRole> {
    if !line.starts_with('M') {
        return None;
    }
    HeaterRole::ALL
        .into_iter()
        .find(|role| line.starts_with(role.set_command()) || line.starts_with(role.wait_command()))
}

/// Extract the temperature from a heater line such as `M109 S215` or `M190 R60.5`.
///
/// Returns the first number directly following an `R` or `S` parameter
/// after the command word. Anything after a `;` is a comment and ignored.
/// Malformed input yields `None`, never a panic.
pub fn parse_heater_command(line: &str) -> Option<f64> {
    let code = line.split(';').next().unwrap_or("");
    // Skip the command word itself, e.g. "M104"
    let params = code
        .char_indices()
        .find(|(_, c)| c.is_whitespace() || (c.is_ascii_alphabetic() && *c != 'M'))
        .map(|(idx, _)| &code[idx..])?;

    for (idx, c) in params.char_indices() {
        if c != 'S' && c != 'R' {
            continue;
        }
        let rest = &params[idx + 1..];
        let end = rest
            .find(|ch: char| !(ch.is_ascii_digit() || ch == '.'))
            .unwrap_or(rest.len());
        let literal = &rest[..end];
        if !literal.starts_with(|ch: char| ch.is_ascii_digit()) {
            continue;
        }
        return match literal.parse::<f64>() {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::debug!("Malformed heater value '{}' in '{}': {}", literal, line.trim_end(), e);
                None
            }
        };
    }
    None
}

/// Format the command that sets `role` to `target`, truncated to whole degrees.
pub fn heater_command(role: HeaterRole, target: f64) -> String {
    format!("{} S{}", role.set_command(), target.trunc() as i64)
}
