//! Instance text format.
//!
//! ```text
//! 0.12          <- distance threshold
//! 0.25, 0.5     <- one "x, y" point per line
//! 0.3, 0.51
//! ```
//!
//! Blank lines are skipped; surrounding whitespace is ignored. Any other line
//! that does not parse is an error carrying its 1-based line number.

use std::path::Path;

use crate::error::{Error, Result};
use crate::types::Point;

/// A parsed instance: threshold plus points in file order.
#[derive(Clone, Debug, PartialEq)]
pub struct Instance {
    pub distance: f64,
    pub points: Vec<Point>,
}

impl Instance {
    pub fn parse(text: &str) -> Result<Self> {
        let mut lines = text
            .lines()
            .enumerate()
            .map(|(i, l)| (i + 1, l.trim()))
            .filter(|(_, l)| !l.is_empty());

        let Some((line, first)) = lines.next() else {
            return Err(Error::Parse {
                line: 1,
                message: "missing distance".into(),
            });
        };
        let distance = number(first, line, "distance")?;

        let mut points = Vec::new();
        for (line, text) in lines {
            let mut fields = text.split(',');
            let (Some(x), Some(y), None) = (fields.next(), fields.next(), fields.next()) else {
                return Err(Error::Parse {
                    line,
                    message: format!("expected \"x, y\", got {text:?}"),
                });
            };
            points.push(Point::new(number(x, line, "x")?, number(y, line, "y")?));
        }
        Ok(Self { distance, points })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }
}

fn number(field: &str, line: usize, what: &str) -> Result<f64> {
    let field = field.trim();
    let value: f64 = field.parse().map_err(|_| Error::Parse {
        line,
        message: format!("{what}: not a number: {field:?}"),
    })?;
    if !value.is_finite() {
        return Err(Error::Parse {
            line,
            message: format!("{what}: not finite: {field:?}"),
        });
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_distance_and_points() {
        let inst = Instance::parse("1.5\n0, 0\n\n 1.0 ,0\n0,3\r\n0, 3.2\n").unwrap();
        assert_eq!(inst.distance, 1.5);
        assert_eq!(
            inst.points,
            vec![
                Point::new(0.0, 0.0),
                Point::new(1.0, 0.0),
                Point::new(0.0, 3.0),
                Point::new(0.0, 3.2),
            ]
        );
    }

    #[test]
    fn distance_only_is_an_empty_instance() {
        let inst = Instance::parse("0.5\n").unwrap();
        assert!(inst.points.is_empty());
    }

    #[test]
    fn errors_carry_line_numbers() {
        let err = |text: &str| match Instance::parse(text) {
            Err(Error::Parse { line, .. }) => line,
            other => panic!("expected parse error, got {other:?}"),
        };
        assert_eq!(err(""), 1);
        assert_eq!(err("abc\n1, 2"), 1);
        assert_eq!(err("1\n1, 2\n\n3"), 4);
        assert_eq!(err("1\n1, 2, 3"), 2);
        assert_eq!(err("1\n1, x"), 2);
        assert_eq!(err("1\ninf, 2"), 2);
        assert_eq!(err("NaN"), 1);
    }
}
