use crate::core::model::{FieldKey, FieldRecord, PropertyRecord};
use crate::normalize::{
    decompose_address, parse_area, parse_count, parse_free_text, parse_full_date, parse_price,
    parse_year_month, whole_number,
};

/// Normalizes every field of `fields` into a typed record.
pub fn assemble_record(fields: &FieldRecord) -> PropertyRecord {
    let text = move |key: FieldKey| parse_free_text(fields.get(key));
    let raw = move |key: FieldKey| fields.get(key).unwrap_or_default();

    let address = text(FieldKey::Address);
    let price = parse_price(raw(FieldKey::Price));
    let area = parse_area(raw(FieldKey::Area));

    PropertyRecord {
        address_parts: decompose_address(&address),
        address,
        price,
        price_per_square_meter: price_per_square_meter(price, area),
        layout: text(FieldKey::Layout),
        area,
        year_built: parse_year_month(raw(FieldKey::YearBuilt)),
        floor_info: text(FieldKey::FloorInfo),
        transportation: text(FieldKey::Transportation),
        management_fee: parse_price(raw(FieldKey::ManagementFee)),
        repair_reserve_fund: parse_price(raw(FieldKey::RepairReserveFund)),
        direction: text(FieldKey::Direction),
        balcony_area: parse_area(raw(FieldKey::BalconyArea)),
        current_situation: text(FieldKey::CurrentSituation),
        structure: text(FieldKey::Structure),
        total_units: parse_count(raw(FieldKey::TotalUnits)),
        management_company: text(FieldKey::ManagementCompany),
        management_form: text(FieldKey::ManagementForm),
        land_rights: text(FieldKey::LandRights),
        transaction_mode: text(FieldKey::TransactionMode),
        information_release_date: parse_full_date(raw(FieldKey::InformationReleaseDate)),
        next_scheduled_update_date: parse_full_date(raw(FieldKey::NextScheduledUpdateDate)),
        property_number: text(FieldKey::PropertyNumber),
        other_fees: text(FieldKey::OtherFees),
        parking: text(FieldKey::Parking),
    }
}

/// Whole yen per square metre, when both inputs are usable.
fn price_per_square_meter(price: Option<i64>, area: Option<f64>) -> Option<i64> {
    match (price, area) {
        (Some(price), Some(area)) if price != 0 && area > 0.0 => {
            whole_number((price as f64 / area).floor())
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_fields_give_empty_record() {
        let record = assemble_record(&FieldRecord::new());
        assert_eq!(record, PropertyRecord::default());
        assert_eq!(record.address, "");
        assert_eq!(record.price, None);
        assert_eq!(record.address_parts.region, None);
    }

    #[test]
    fn normalizes_and_derives() {
        let fields: FieldRecord = [
            (FieldKey::Price, "1,980万円"),
            (FieldKey::Area, "45.30㎡"),
            (FieldKey::YearBuilt, "1994年04月"),
            (FieldKey::TotalUnits, "120戸"),
            (FieldKey::Address, "神奈川県横浜市西区1-2-3"),
            (FieldKey::InformationReleaseDate, "2025年07月21日"),
            (FieldKey::Direction, " 南 "),
            (FieldKey::BalconyArea, "-"),
        ]
        .into_iter()
        .map(|(k, v)| (k, v.to_string()))
        .collect();

        let record = assemble_record(&fields);
        assert_eq!(record.price, Some(19_800_000));
        assert_eq!(record.area, Some(45.3));
        assert_eq!(record.year_built, NaiveDate::from_ymd_opt(1994, 4, 1));
        assert_eq!(record.total_units, Some(120));
        assert_eq!(record.price_per_square_meter, Some(437_086));
        assert_eq!(record.address_parts.prefecture.as_deref(), Some("神奈川県"));
        assert_eq!(record.information_release_date, NaiveDate::from_ymd_opt(2025, 7, 21));
        assert_eq!(record.direction, "南");
        assert_eq!(record.balcony_area, None);
    }

    #[test]
    fn out_of_range_values_stay_absent() {
        let fields: FieldRecord = [
            (FieldKey::Price, format!("{}万円", "9".repeat(25))),
            (FieldKey::Area, format!("1{}㎡", "0".repeat(400))),
            (FieldKey::Layout, "3LDK".to_string()),
        ]
        .into_iter()
        .collect();
        let record = assemble_record(&fields);
        assert_eq!(record.price, None);
        assert_eq!(record.area, None);
        assert_eq!(record.price_per_square_meter, None);
        assert_eq!(record.layout, "3LDK");
    }

    #[test]
    fn tiny_area_does_not_overflow_unit_price() {
        assert_eq!(price_per_square_meter(Some(i64::MAX / 2), Some(1e-300)), None);
    }

    #[test]
    fn unparseable_value_only_drops_that_field() {
        let fields: FieldRecord = [(FieldKey::Price, "応相談"), (FieldKey::Layout, "2LDK")]
            .into_iter()
            .map(|(k, v)| (k, v.to_string()))
            .collect();
        let record = assemble_record(&fields);
        assert_eq!(record.price, None);
        assert_eq!(record.price_per_square_meter, None);
        assert_eq!(record.layout, "2LDK");
    }
}
