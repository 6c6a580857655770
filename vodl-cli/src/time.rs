use crate::error::{AppError, Result};

/// Parses a point in time into seconds.
///
/// Accepts plain seconds (`90`, `90.5`), colon separated `MM:SS` or
/// `HH:MM:SS`, and unit suffixed `1h30m`, `45s` or `2h5s`.
pub fn parse_time(input: &str) -> Result<f64> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(invalid(input, "empty value"));
    }

    let seconds = if trimmed.contains(':') {
        parse_clock(input, trimmed)?
    } else if trimmed.ends_with(|c: char| matches!(c, 'h' | 'm' | 's')) {
        parse_units(input, trimmed)?
    } else {
        parse_number(input, trimmed)?
    };

    if !seconds.is_finite() || seconds < 0.0 {
        return Err(invalid(input, "must be a non-negative number of seconds"));
    }
    Ok(seconds)
}

/// Parses the optional start and end of a range, rejecting ranges that end
/// before they start.
pub fn parse_range(start: Option<&str>, end: Option<&str>) -> Result<(Option<f64>, Option<f64>)> {
    let start = start.map(parse_time).transpose()?;
    let end = end.map(parse_time).transpose()?;

    if let (Some(start), Some(end)) = (start, end)
        && end <= start
    {
        return Err(AppError::InvalidInput(format!(
            "end time {end}s must be after start time {start}s"
        )));
    }
    Ok((start, end))
}

fn parse_clock(input: &str, value: &str) -> Result<f64> {
    let parts: Vec<&str> = value.split(':').collect();
    let (hours, minutes, seconds) = match parts.as_slice() {
        [m, s] => ("0", *m, *s),
        [h, m, s] => (*h, *m, *s),
        _ => return Err(invalid(input, "expected MM:SS or HH:MM:SS")),
    };

    let hours = parse_whole(input, hours)?;
    let minutes = parse_whole(input, minutes)?;
    let seconds = parse_number(input, seconds)?;
    if minutes >= 60 || seconds >= 60.0 {
        return Err(invalid(input, "minutes and seconds must be below 60"));
    }
    Ok(hours as f64 * 3600.0 + minutes as f64 * 60.0 + seconds)
}

fn parse_units(input: &str, value: &str) -> Result<f64> {
    let mut total = 0.0;
    let mut number = String::new();
    let mut last_unit = None;

    for ch in value.chars() {
        let scale = match ch {
            'h' => 3600.0,
            'm' => 60.0,
            's' => 1.0,
            c if c.is_ascii_digit() || c == '.' => {
                number.push(c);
                continue;
            }
            _ => return Err(invalid(input, format!("unexpected character '{ch}'"))),
        };
        if number.is_empty() {
            return Err(invalid(input, format!("missing number before '{ch}'")));
        }
        if last_unit.is_some_and(|last| last <= scale) {
            return Err(invalid(input, "units must be in h, m, s order"));
        }
        total += parse_number(input, &number)? * scale;
        number.clear();
        last_unit = Some(scale);
    }
    Ok(total)
}

fn parse_whole(input: &str, value: &str) -> Result<u64> {
    value
        .parse()
        .map_err(|_| invalid(input, format!("'{value}' is not a whole number")))
}

fn parse_number(input: &str, value: &str) -> Result<f64> {
    value
        .parse()
        .map_err(|_| invalid(input, format!("'{value}' is not a number")))
}

fn invalid(input: &str, reason: impl Into<String>) -> AppError {
    AppError::InvalidTime {
        input: input.to_string(),
        reason: reason.into(),
    }
}
