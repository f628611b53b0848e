//! Column extraction from data frames

use crate::error::{GridFillError, Result};
use crate::grid::GridIndexMapper;
use crate::imputation::is_missing;
use polars::prelude::*;

/// Look up a column, mapping absence to `MissingField`
pub(crate) fn column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Series> {
    df.column(name)
        .map(|c| c.as_materialized_series())
        .map_err(|_| GridFillError::MissingField(name.to_string()))
}

/// True for string-typed columns
pub(crate) fn is_text(series: &Series) -> bool {
    matches!(series.dtype(), DataType::String)
}

/// True when every non-empty token of a string column parses as a real.
///
/// A column with no tokens at all also qualifies; CSV readers type an
/// all-empty column as string.
pub(crate) fn is_numeric_text(series: &Series) -> Result<bool> {
    let ca = series.str()?;
    Ok(ca
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .all(|s| s.parse::<f64>().is_ok()))
}

/// Read a column as reals; nulls and NaN become `None`
pub(crate) fn read_numeric(series: &Series) -> Result<Vec<Option<f64>>> {
    if is_text(series) {
        let ca = series.str()?;
        return Ok(ca
            .into_iter()
            .map(|v| v.and_then(|s| s.trim().parse::<f64>().ok()))
            .map(|v| if is_missing(v) { None } else { v })
            .collect());
    }
    let cast = series.cast(&DataType::Float64)?;
    let ca = cast.f64()?;
    Ok(ca.into_iter()
        .map(|v| if is_missing(v) { None } else { v })
        .collect())
}

/// Read a column as tokens; nulls and empty strings become `None`
pub(crate) fn read_text(series: &Series) -> Result<Vec<Option<String>>> {
    let cast = series.cast(&DataType::String)?;
    let ca = cast.str()?;
    Ok(ca.into_iter()
        .map(|v| v.filter(|s| !s.is_empty()).map(str::to_string))
        .collect())
}

/// Read and validate the identifier column.
///
/// Every identifier must fall in `[1, rows*cols]`, appear once, and the
/// table must hold exactly one record per cell.
pub fn read_identifiers(df: &DataFrame, id_column: &str, mapper: &GridIndexMapper) -> Result<Vec<usize>> {
    let series = column(df, id_column)?;
    let cast = series.cast(&DataType::Int64)?;
    let ca = cast.i64()?;

    let mut seen = vec![false; mapper.len()];
    let mut oids = Vec::with_capacity(ca.len());

    for (i, raw) in ca.into_iter().enumerate() {
        let raw = raw.ok_or_else(|| {
            GridFillError::DataError(format!("{} is empty at record {}", id_column, i))
        })?;
        let oid = mapper.check_oid(raw)?;
        if std::mem::replace(&mut seen[oid - 1], true) {
            return Err(GridFillError::DuplicateIdentifier(raw));
        }
        oids.push(oid);
    }

    if oids.len() != mapper.len() {
        return Err(GridFillError::DimensionMismatch {
            rows: mapper.rows(),
            cols: mapper.cols(),
            expected: mapper.len(),
            actual: oids.len(),
        });
    }

    Ok(oids)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_text_detection() {
        let df = df!(
            "numeric" => &[Some(""), None, Some(" -97.5"), Some("3")],
            "empty" => &[None::<&str>, None, None, None],
            "bands" => &[Some("n78"), Some("-1.0"), None, Some("n41")],
        )
        .unwrap();

        assert!(is_numeric_text(column(&df, "numeric").unwrap()).unwrap());
        assert!(is_numeric_text(column(&df, "empty").unwrap()).unwrap());
        assert!(!is_numeric_text(column(&df, "bands").unwrap()).unwrap());

        let values = read_numeric(column(&df, "numeric").unwrap()).unwrap();
        assert_eq!(values, vec![None, None, Some(-97.5), Some(3.0)]);
    }

    #[test]
    fn test_read_numeric_treats_nan_as_missing() {
        let df = df!("v" => &[Some(1.0), None, Some(f64::NAN)]).unwrap();
        let values = read_numeric(column(&df, "v").unwrap()).unwrap();
        assert_eq!(values, vec![Some(1.0), None, None]);
    }

    #[test]
    fn test_read_text_from_integers() {
        let df = df!("band" => &[Some(78i64), None, Some(41)]).unwrap();
        let values = read_text(column(&df, "band").unwrap()).unwrap();
        assert_eq!(values, vec![Some("78".to_string()), None, Some("41".to_string())]);
    }

    #[test]
    fn test_missing_column() {
        let df = df!("a" => &[1.0]).unwrap();
        assert!(matches!(column(&df, "b"), Err(GridFillError::MissingField(ref n)) if n == "b"));
    }

    #[test]
    fn test_identifiers() {
        let mapper = GridIndexMapper::new(2, 2).unwrap();

        let df = df!("OID" => &[3i64, 1, 4, 2]).unwrap();
        assert_eq!(read_identifiers(&df, "OID", &mapper).unwrap(), vec![3, 1, 4, 2]);

        let df = df!("OID" => &[1i64, 2, 3, 5]).unwrap();
        assert!(matches!(
            read_identifiers(&df, "OID", &mapper),
            Err(GridFillError::OutOfRange { oid: 5, max: 4 })
        ));

        let df = df!("OID" => &[1i64, 2, 2, 4]).unwrap();
        assert!(matches!(
            read_identifiers(&df, "OID", &mapper),
            Err(GridFillError::DuplicateIdentifier(2))
        ));

        let df = df!("OID" => &[1i64, 2, 3]).unwrap();
        assert!(matches!(
            read_identifiers(&df, "OID", &mapper),
            Err(GridFillError::DimensionMismatch { expected: 4, actual: 3, .. })
        ));
    }
}
