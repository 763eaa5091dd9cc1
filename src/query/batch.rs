//! Query batches and console-style barcode lines
//!
//! A batch holds one `<angle> <offset>` pair per line. Blank lines and
//! lines starting with `#` are skipped. The first bad line fails the whole
//! batch.

use std::io::BufRead;

use crate::error::{BipersError, Result};

use super::{Barcode, LineQuery};

fn batch_error(line: usize, message: impl Into<String>) -> BipersError {
    BipersError::QueryBatch { line, message: message.into() }
}

fn parse_line(number: usize, text: &str) -> Result<Option<LineQuery>> {
    let text = text.trim();
    if text.is_empty() || text.starts_with('#') {
        return Ok(None);
    }
    let fields: Vec<&str> = text.split_whitespace().collect();
    let [angle, offset] = fields.as_slice() else {
        return Err(batch_error(number, format!("expected '<angle> <offset>', got '{}'", text)));
    };
    let angle: f64 = angle.parse().map_err(|_| batch_error(number, format!("bad angle '{}'", angle)))?;
    let offset: f64 = offset.parse().map_err(|_| batch_error(number, format!("bad offset '{}'", offset)))?;
    LineQuery::new(angle, offset).map(Some).map_err(|e| match e {
        BipersError::Parameter(message) => batch_error(number, message),
        other => other,
    })
}

pub fn parse_query_batch(text: &str) -> Result<Vec<LineQuery>> {
    let mut queries = Vec::new();
    for (i, line) in text.lines().enumerate() {
        if let Some(query) = parse_line(i + 1, line)? {
            queries.push(query);
        }
    }
    Ok(queries)
}

pub fn read_query_batch<R: BufRead>(reader: R) -> Result<Vec<LineQuery>> {
    let mut queries = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        if let Some(query) = parse_line(i + 1, &line?)? {
            queries.push(query);
        }
    }
    Ok(queries)
}

/// `%g`-style rendering with six significant digits
pub fn format_general(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    if value == 0.0 {
        return "0".to_string();
    }

    let scientific = format!("{:.5e}", value);
    let (mantissa, exponent) = scientific.split_once('e').unwrap_or((scientific.as_str(), "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);
    if !(-4..6).contains(&exponent) {
        let sign = if exponent < 0 { '-' } else { '+' };
        return format!("{}e{}{:02}", trim_zeros(mantissa), sign, exponent.abs());
    }
    let decimals = (5 - exponent) as usize;
    trim_zeros(&format!("{:.*}", decimals, value)).to_string()
}

fn trim_zeros(text: &str) -> &str {
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.')
    } else {
        text
    }
}

/// `<angle> <offset>: <birth> <death|inf> x<mult>, ...`
pub fn format_barcode_line(query: &LineQuery, barcode: &Barcode) -> String {
    let bars: Vec<String> = barcode
        .iter()
        .map(|b| format!("{} {} x{}", format_general(b.birth), format_general(b.death), b.multiplicity))
        .collect();
    format!("{} {}: {}", format_general(query.angle), format_general(query.offset), bars.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::query::Bar;

    #[test]
    fn test_parse_batch() {
        let text = "# reference lines\n23 -0.22\n\n   67 1.88\n10 0.92\n";
        let queries = parse_query_batch(text).unwrap();
        assert_eq!(queries.len(), 3);
        assert_eq!(queries[1], LineQuery { angle: 67.0, offset: 1.88 });
    }

    #[test]
    fn test_out_of_range_angle_names_line() {
        let text = "23 -0.22\n100 0.92\n10 0.92\n";
        let err = parse_query_batch(text).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parameter);
        match err {
            BipersError::QueryBatch { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_malformed_lines() {
        assert!(parse_query_batch("45").is_err());
        assert!(parse_query_batch("45 1 2").is_err());
        assert!(parse_query_batch("abc 1").is_err());
        let err = read_query_batch("10 1\n\n45 x\n".as_bytes()).unwrap_err();
        assert!(err.to_string().contains("line 3"));
    }

    #[test]
    fn test_format_general() {
        assert_eq!(format_general(0.5182875204812256), "0.518288");
        assert_eq!(format_general(3.0), "3");
        assert_eq!(format_general(-0.22), "-0.22");
        assert_eq!(format_general(12.058732175382605), "12.0587");
        assert_eq!(format_general(1234567.0), "1.23457e+06");
        assert_eq!(format_general(0.00001234), "1.234e-05");
        assert_eq!(format_general(f64::INFINITY), "inf");
    }

    #[test]
    fn test_barcode_line() {
        let query = LineQuery::new(90.0, -1.0).unwrap();
        let barcode = Barcode::from_bars([Bar::new(0.0, f64::INFINITY, 1), Bar::new(1.5, 3.0, 1)]);
        assert_eq!(format_barcode_line(&query, &barcode), "90 -1: 0 inf x1, 1.5 3 x1");
        assert_eq!(format_barcode_line(&query, &Barcode::default()), "90 -1: ");
    }
}
