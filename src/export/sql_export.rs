use anyhow::Result;

use crate::core::model::PropertyRecord;
use crate::export::Exporter;

const UNTITLED: &str = "物件名未指定";
const PROPERTY_TYPE: &str = "中古マンション";
const STATUS: &str = "for sale";

#[derive(Debug, Clone, PartialEq)]
enum SqlValue {
    Null,
    Text(String),
    Int(i64),
    Float(f64),
    /// Emitted verbatim.
    Expr(&'static str),
}

impl SqlValue {
    fn text(value: &str) -> Self {
        SqlValue::Text(value.to_string())
    }

    fn opt_text(value: Option<&str>) -> Self {
        value.map(Self::text).unwrap_or(SqlValue::Null)
    }

    fn int(value: Option<i64>) -> Self {
        value.map(SqlValue::Int).unwrap_or(SqlValue::Null)
    }

    /// Non-finite values have no SQL literal and render as `NULL`.
    fn float(value: Option<f64>) -> Self {
        value
            .filter(|v| v.is_finite())
            .map(SqlValue::Float)
            .unwrap_or(SqlValue::Null)
    }

    fn date(value: Option<chrono::NaiveDate>) -> Self {
        value
            .map(|date| SqlValue::Text(date.to_string()))
            .unwrap_or(SqlValue::Null)
    }

    fn render(&self) -> String {
        match self {
            SqlValue::Null => "NULL".to_string(),
            SqlValue::Text(text) => format!("'{}'", text.replace('\'', "''")),
            SqlValue::Int(value) => value.to_string(),
            SqlValue::Float(value) => value.to_string(),
            SqlValue::Expr(expr) => expr.to_string(),
        }
    }
}

/// Renders one `INSERT` row for the listing table.
#[derive(Debug, Clone)]
pub struct SqlExporter {
    table: String,
}

impl Default for SqlExporter {
    fn default() -> Self {
        Self::new("properties")
    }
}

impl SqlExporter {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
        }
    }

    fn columns(record: &PropertyRecord) -> Vec<(&'static str, SqlValue)> {
        use SqlValue::{Expr, Null};

        let address = &record.address_parts;
        vec![
            ("title", SqlValue::text(UNTITLED)),
            ("price", SqlValue::int(record.price)),
            ("pricePerSquareMeter", SqlValue::int(record.price_per_square_meter)),
            ("address", SqlValue::text(&record.address)),
            ("layout", SqlValue::text(&record.layout)),
            ("area", SqlValue::float(record.area)),
            ("floorInfo", SqlValue::text(&record.floor_info)),
            ("structure", SqlValue::text(&record.structure)),
            ("managementFee", SqlValue::int(record.management_fee)),
            ("areaOfUse", Null),
            ("transportation", SqlValue::text(&record.transportation)),
            ("walkDistance", Null),
            ("location", Null),
            ("propertyType", SqlValue::text(PROPERTY_TYPE)),
            ("yearBuilt", SqlValue::date(record.year_built)),
            ("balconyArea", SqlValue::float(record.balcony_area)),
            ("totalUnits", SqlValue::int(record.total_units)),
            ("repairReserveFund", SqlValue::int(record.repair_reserve_fund)),
            ("landLeaseFee", Null),
            ("rightFee", Null),
            ("depositGuarantee", Null),
            ("maintenanceFees", Null),
            ("otherFees", SqlValue::text(&record.other_fees)),
            ("bicycleParking", Null),
            ("bikeStorage", Null),
            ("siteArea", Null),
            ("pets", Null),
            ("landRights", SqlValue::text(&record.land_rights)),
            ("managementForm", SqlValue::text(&record.management_form)),
            ("landLawNotification", Null),
            ("currentSituation", SqlValue::text(&record.current_situation)),
            ("extraditionPossibleDate", Null),
            ("transactionMode", SqlValue::text(&record.transaction_mode)),
            ("propertyNumber", SqlValue::text(&record.property_number)),
            ("informationReleaseDate", SqlValue::date(record.information_release_date)),
            ("nextScheduledUpdateDate", SqlValue::date(record.next_scheduled_update_date)),
            ("remarks", Null),
            ("evaluationCertificate", Null),
            ("parking", SqlValue::text(&record.parking)),
            ("kitchen", Null),
            ("bathToilet", Null),
            ("facilitiesServices", Null),
            ("others", Null),
            ("images", Expr("ARRAY[]::text[]")),
            ("zipcode", SqlValue::opt_text(address.zipcode.as_deref())),
            ("area_level_1", SqlValue::opt_text(address.region.as_deref())),
            ("area_level_2", SqlValue::opt_text(address.prefecture.as_deref())),
            ("area_level_3", SqlValue::opt_text(address.city.as_deref())),
            ("area_level_4", SqlValue::opt_text(address.ward.as_deref())),
            ("status", SqlValue::text(STATUS)),
            ("direction", SqlValue::text(&record.direction)),
            ("urbanPlanning", Null),
            ("condominiumSalesCompany", Null),
            ("constructionCompany", Null),
            ("designCompany", Null),
            ("managementCompany", SqlValue::text(&record.management_company)),
            ("buildingArea", Null),
            ("landArea", Null),
            ("accessSituation", Null),
            ("buildingCoverageRatio", Null),
            ("floorAreaRatio", Null),
            ("estimatedRent", Null),
            ("assumedYield", Null),
            ("currentRent", Null),
            ("currentYield", Null),
            ("rentalStatus", Null),
            ("numberOfUnitsInTheBuilding", Null),
            ("exclusiveAreaOfEachResidence", Null),
        ]
    }
}

impl Exporter for SqlExporter {
    fn render(&self, record: &PropertyRecord) -> Result<String> {
        let columns = Self::columns(record);
        let names = columns
            .iter()
            .map(|(name, _)| *name)
            .collect::<Vec<_>>()
            .join(",\n    ");
        let values = columns
            .iter()
            .map(|(_, value)| value.render())
            .collect::<Vec<_>>()
            .join(",\n    ");
        Ok(format!(
            "INSERT INTO {} (\n    {}\n)\nVALUES (\n    {}\n);\n",
            self.table, names, values
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn column_and_value_counts_match() {
        let columns = SqlExporter::columns(&PropertyRecord::default());
        assert_eq!(columns.len(), 68);
        let mut names: Vec<_> = columns.iter().map(|(name, _)| *name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), 68);
    }

    #[test]
    fn quotes_are_doubled_and_missing_is_null() -> Result<()> {
        let record = PropertyRecord {
            address: "O'Hara 1-2".to_string(),
            price: Some(19_800_000),
            area: Some(45.3),
            year_built: NaiveDate::from_ymd_opt(1994, 4, 1),
            ..Default::default()
        };
        let sql = SqlExporter::default().render(&record)?;
        assert!(sql.starts_with("INSERT INTO properties ("));
        assert!(sql.contains("'O''Hara 1-2'"));
        assert!(sql.contains("    19800000,\n"));
        assert!(sql.contains("    45.3,\n"));
        assert!(sql.contains("'1994-04-01'"));
        assert!(sql.contains("ARRAY[]::text[]"));
        assert!(sql.trim_end().ends_with(");"));
        Ok(())
    }

    #[test]
    fn empty_free_text_is_an_empty_literal() {
        assert_eq!(SqlValue::text("").render(), "''");
        assert_eq!(SqlValue::int(None).render(), "NULL");
    }

    #[test]
    fn non_finite_area_is_null() -> Result<()> {
        assert_eq!(SqlValue::float(Some(f64::INFINITY)).render(), "NULL");
        assert_eq!(SqlValue::float(Some(f64::NAN)).render(), "NULL");
        let record = PropertyRecord {
            area: Some(f64::NAN),
            ..Default::default()
        };
        let sql = SqlExporter::default().render(&record)?;
        assert!(!sql.contains("NaN"));
        Ok(())
    }

    #[test]
    fn custom_table_name() -> Result<()> {
        let sql = SqlExporter::new("listings").render(&PropertyRecord::default())?;
        assert!(sql.starts_with("INSERT INTO listings ("));
        Ok(())
    }
}
