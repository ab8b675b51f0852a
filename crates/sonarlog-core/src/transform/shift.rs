use crate::error::{Result, SonarError};
use crate::frame::{Frame, Length};

/// Parse a depth shift in meters: `m1.15` subtracts, `p1.15` (or `1.15`) adds.
///
/// `-` and `+` are not accepted as signs so that the value can be passed
/// on a command line without being mistaken for a flag.
pub fn parse_depth_shift(input: &str) -> Result<Length> {
    let input = input.trim();
    let invalid = || SonarError::InvalidInput(format!("cannot parse depth shift '{input}'"));

    let (sign, digits) = match input.chars().next() {
        Some('m') | Some('M') => (-1.0, &input[1..]),
        Some('p') | Some('P') => (1.0, &input[1..]),
        Some(c) if c.is_ascii_digit() || c == '.' => (1.0, input),
        _ => return Err(invalid()),
    };
    if digits.starts_with(&['+', '-'][..]) {
        return Err(invalid());
    }
    let value: f64 = digits.parse().map_err(|_| invalid())?;
    if !value.is_finite() {
        return Err(invalid());
    }
    Ok(Length::from_meters(sign * value))
}

/// Add `shift` to the depth of every frame.
pub fn shift_depth(frames: &mut [Frame], shift: Length) {
    for frame in frames {
        frame.depth = frame.depth + shift;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_signs_and_non_numbers() {
        for bad in ["", "m", "-1.0", "+1.0", "m-1", "pinf", "1.0m", "x1.0"] {
            assert!(parse_depth_shift(bad).is_err(), "accepted '{bad}'");
        }
    }

    #[test]
    fn bare_number_is_positive() {
        assert!((parse_depth_shift("2.5").unwrap().meters() - 2.5).abs() < 1e-12);
    }
}
