//! TSPLIB text reader and writer.
//!
//! A deliberately small subset of the TSPLIB95 format:
//!
//! - `EDGE_WEIGHT_TYPE : EUC_2D` with a `NODE_COORD_SECTION` of
//!   `id x y` lines, distances rounded to the nearest integer;
//! - `EDGE_WEIGHT_TYPE : EXPLICIT` with `EDGE_WEIGHT_FORMAT : FULL_MATRIX`
//!   and an `EDGE_WEIGHT_SECTION` of `DIMENSION²` weights.
//!
//! Header keys are accepted as `KEY : value`, `KEY: value`, or `KEY:value`.
//! Unknown keys (`NAME`, `TYPE`, `COMMENT`, ...) are ignored. A data section
//! ends at `EOF` or at the end of the text.

use std::fmt::Write as _;

use crate::distance::CostMatrix;
use crate::models::InstanceError;

const NODE_COORD_SECTION: &str = "NODE_COORD_SECTION";
const EDGE_WEIGHT_SECTION: &str = "EDGE_WEIGHT_SECTION";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WeightType {
    Euclidean,
    FullMatrix,
}

#[derive(Debug, Default)]
struct Header {
    dimension: Option<usize>,
    dimension_line: usize,
    edge_weight_type: Option<String>,
    edge_weight_format: Option<String>,
}

impl Header {
    fn weight_type(&self, section: Option<&str>) -> Result<WeightType, InstanceError> {
        match self.edge_weight_type.as_deref() {
            Some("EUC_2D") => Ok(WeightType::Euclidean),
            Some("EXPLICIT") => match self.edge_weight_format.as_deref() {
                Some("FULL_MATRIX") => Ok(WeightType::FullMatrix),
                Some(other) => Err(InstanceError::Unsupported(format!(
                    "EDGE_WEIGHT_FORMAT {other}"
                ))),
                None => Err(InstanceError::Unsupported(
                    "EXPLICIT weights without EDGE_WEIGHT_FORMAT".into(),
                )),
            },
            Some(other) => Err(InstanceError::Unsupported(format!("EDGE_WEIGHT_TYPE {other}"))),
            // Coordinates alone imply Euclidean weights.
            None if section == Some(NODE_COORD_SECTION) => Ok(WeightType::Euclidean),
            None => Err(InstanceError::Unsupported("missing EDGE_WEIGHT_TYPE".into())),
        }
    }

    fn expected_section(weight_type: WeightType) -> &'static str {
        match weight_type {
            WeightType::Euclidean => NODE_COORD_SECTION,
            WeightType::FullMatrix => EDGE_WEIGHT_SECTION,
        }
    }
}

/// Splits `KEY : value` into its trimmed parts.
fn key_value(line: &str) -> Option<(&str, &str)> {
    let (key, value) = line.split_once(':')?;
    Some((key.trim(), value.trim()))
}

fn parse_number(token: &str, line: usize) -> Result<f64, InstanceError> {
    token
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| InstanceError::BadNumber {
            line,
            token: token.to_string(),
        })
}

/// Parses a TSPLIB instance into a cost matrix.
///
/// # Errors
///
/// Returns an [`InstanceError`] when the dimension or data section is
/// missing, a number cannot be parsed, the data section holds the wrong
/// number of entries, the weight type is not supported, or an explicit
/// matrix is not symmetric.
///
/// # Examples
///
/// ```
/// use u_tsp::instance::parse_tsplib;
///
/// let text = "NAME : square
/// TYPE : TSP
/// DIMENSION : 4
/// EDGE_WEIGHT_TYPE : EUC_2D
/// NODE_COORD_SECTION
/// 1 0 0
/// 2 3 0
/// 3 3 4
/// 4 0 4
/// EOF
/// ";
/// let costs = parse_tsplib(text).expect("valid instance");
/// assert_eq!(costs.size(), 4);
/// assert!((costs.cost(0, 2) - 5.0).abs() < 1e-10);
/// ```
pub fn parse_tsplib(text: &str) -> Result<CostMatrix, InstanceError> {
    let mut header = Header::default();
    let mut lines = text.lines().enumerate().map(|(i, l)| (i + 1, l.trim()));
    let mut section: Option<&str> = None;

    for (number, line) in lines.by_ref() {
        if line.is_empty() {
            continue;
        }
        let keyword = line.trim_end_matches(':').trim();
        if keyword == NODE_COORD_SECTION || keyword == EDGE_WEIGHT_SECTION {
            section = Some(if keyword == NODE_COORD_SECTION {
                NODE_COORD_SECTION
            } else {
                EDGE_WEIGHT_SECTION
            });
            break;
        }
        if keyword == "EOF" {
            break;
        }
        let Some((key, value)) = key_value(line) else {
            continue;
        };
        match key {
            "DIMENSION" => {
                let dimension = value
                    .parse::<usize>()
                    .map_err(|_| InstanceError::BadNumber {
                        line: number,
                        token: value.to_string(),
                    })?;
                header.dimension = Some(dimension);
                header.dimension_line = number;
            }
            "EDGE_WEIGHT_TYPE" => header.edge_weight_type = Some(value.to_string()),
            "EDGE_WEIGHT_FORMAT" => header.edge_weight_format = Some(value.to_string()),
            _ => {}
        }
    }

    let dimension = header.dimension.ok_or(InstanceError::MissingDimension)?;
    if dimension == 0 {
        return Err(InstanceError::Empty);
    }
    let weight_type = header.weight_type(section)?;
    let expected = Header::expected_section(weight_type);
    if section != Some(expected) {
        return Err(InstanceError::MissingSection(expected));
    }

    let data = lines.take_while(|(_, line)| *line != "EOF");
    match weight_type {
        WeightType::Euclidean => {
            let mut points = Vec::new();
            for (number, line) in data.filter(|(_, l)| !l.is_empty()) {
                let tokens: Vec<&str> = line.split_whitespace().collect();
                if tokens.len() != 3 {
                    return Err(InstanceError::Unsupported(format!(
                        "line {number}: expected 'id x y', got '{line}'"
                    )));
                }
                points.push((parse_number(tokens[1], number)?, parse_number(tokens[2], number)?));
            }
            if points.len() != dimension {
                return Err(InstanceError::CountMismatch {
                    expected: dimension,
                    found: points.len(),
                });
            }
            Ok(CostMatrix::from_coordinates(&points))
        }
        WeightType::FullMatrix => {
            let expected = dimension
                .checked_mul(dimension)
                .ok_or_else(|| InstanceError::BadNumber {
                    line: header.dimension_line,
                    token: dimension.to_string(),
                })?;
            let mut weights = Vec::new();
            for (number, line) in data {
                for token in line.split_whitespace() {
                    weights.push(parse_number(token, number)?);
                }
            }
            if weights.len() != expected {
                return Err(InstanceError::CountMismatch {
                    expected,
                    found: weights.len(),
                });
            }
            CostMatrix::from_full(dimension, &weights)
        }
    }
}

/// Writes `costs` as an `EXPLICIT` / `FULL_MATRIX` TSPLIB instance with
/// integer weights.
///
/// Weights are rounded to the nearest integer, so matrices with integral
/// costs survive a round trip through [`parse_tsplib`] unchanged.
pub fn write_full_matrix(name: &str, costs: &CostMatrix) -> String {
    let n = costs.size();
    let mut out = String::with_capacity(64 + n * n * 4);
    // Writing into a String cannot fail.
    let _ = writeln!(out, "NAME : {name}");
    let _ = writeln!(out, "TYPE : TSP");
    let _ = writeln!(out, "DIMENSION : {n}");
    let _ = writeln!(out, "EDGE_WEIGHT_TYPE : EXPLICIT");
    let _ = writeln!(out, "EDGE_WEIGHT_FORMAT : FULL_MATRIX");
    let _ = writeln!(out, "{EDGE_WEIGHT_SECTION}");
    for i in 0..n {
        let row: Vec<String> = (0..n)
            .map(|j| format!("{}", costs.cost(i, j).round() as i64))
            .collect();
        let _ = writeln!(out, "{}", row.join(" "));
    }
    out.push_str("EOF\n");
    out
}
