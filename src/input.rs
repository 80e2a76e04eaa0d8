//! Spreadsheet loader (spec §6 inputs).
//!
//! Reads an xlsx workbook with columns `Package ID`, `Address`, `lat`,
//! `long` (additional columns ignored). Row order is significant: the
//! first data row becomes delivery id 1; the depot is injected by the
//! caller at index 0.

use std::path::Path;

use calamine::{open_workbook, Data, DataType, Reader, Xlsx};

use crate::error::{RoutingError, RoutingResult};
use crate::geo::{Coordinate, Delivery};

const REQUIRED_COLUMNS: [&str; 4] = ["Package ID", "Address", "lat", "long"];

pub fn load_deliveries(path: &Path) -> RoutingResult<Vec<Delivery>> {
    let mut workbook: Xlsx<_> = open_workbook(path)
        .map_err(|e| RoutingError::InputMalformed(format!("cannot open {:?}: {e}", path)))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| RoutingError::InputMalformed("workbook has no sheets".to_string()))?;

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| RoutingError::InputMalformed(format!("cannot read sheet: {e}")))?;

    let mut rows = range.rows();
    let header = rows
        .next()
        .ok_or_else(|| RoutingError::InputMalformed("spreadsheet has no header row".to_string()))?;

    let col_idx = |name: &str| -> RoutingResult<usize> {
        header
            .iter()
            .position(|cell| cell.as_string().as_deref() == Some(name))
            .ok_or_else(|| {
                RoutingError::InputMalformed(format!("missing required column {name:?}"))
            })
    };

    for required in REQUIRED_COLUMNS {
        col_idx(required)?;
    }
    let id_col = col_idx("Package ID")?;
    let lat_col = col_idx("lat")?;
    let lon_col = col_idx("long")?;

    let mut deliveries = Vec::new();
    for (row_idx, row) in rows.enumerate() {
        let label = row
            .get(id_col)
            .and_then(Data::as_string)
            .ok_or_else(|| {
                RoutingError::InputMalformed(format!("row {}: missing Package ID", row_idx + 2))
            })?;
        let lat = row.get(lat_col).and_then(Data::as_f64).ok_or_else(|| {
            RoutingError::InputMalformed(format!("row {}: non-numeric lat", row_idx + 2))
        })?;
        let lon = row.get(lon_col).and_then(Data::as_f64).ok_or_else(|| {
            RoutingError::InputMalformed(format!("row {}: non-numeric long", row_idx + 2))
        })?;

        let coord = Coordinate::new(lat, lon);
        if !coord.is_valid() {
            return Err(RoutingError::InputMalformed(format!(
                "row {}: coordinate out of range ({lat}, {lon})",
                row_idx + 2
            )));
        }

        deliveries.push(Delivery {
            id: row_idx + 1,
            label,
            coord,
        });
    }

    Ok(deliveries)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_input_malformed() {
        let err = load_deliveries(Path::new("/nonexistent/path.xlsx")).unwrap_err();
        assert!(matches!(err, RoutingError::InputMalformed(_)));
    }
}
