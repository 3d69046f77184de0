use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// One stamp placement: a 1-based page number and the lower-left corner
/// of the stamp in page units (origin bottom-left). The page is only
/// checked against a document when stamping it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StampLocation {
    pub page: i64,
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Error, PartialEq)]
pub enum ParseLocationError {
    #[error("expected PAGE,X,Y but found {found} field(s)")]
    FieldCount { found: usize },

    #[error("page '{value}' is not an integer")]
    Page { value: String },

    #[error("coordinate '{value}' is not a number")]
    Coordinate { value: String },

    #[error("coordinate '{value}' must be finite")]
    NonFinite { value: String },
}

impl StampLocation {
    pub fn new(page: i64, x: f32, y: f32) -> Self {
        Self { page, x, y }
    }
}

impl FromStr for StampLocation {
    type Err = ParseLocationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = s.split(',').map(str::trim).collect();
        if fields.len() != 3 {
            return Err(ParseLocationError::FieldCount {
                found: fields.len(),
            });
        }

        let page: i64 = fields[0].parse().map_err(|_| ParseLocationError::Page {
            value: fields[0].to_string(),
        })?;

        Ok(Self {
            page,
            x: parse_coordinate(fields[1])?,
            y: parse_coordinate(fields[2])?,
        })
    }
}

fn parse_coordinate(s: &str) -> Result<f32, ParseLocationError> {
    let v: f32 = s.parse().map_err(|_| ParseLocationError::Coordinate {
        value: s.to_string(),
    })?;
    if !v.is_finite() {
        return Err(ParseLocationError::NonFinite {
            value: s.to_string(),
        });
    }
    Ok(v)
}

impl fmt::Display for StampLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.page, self.x, self.y)
    }
}
