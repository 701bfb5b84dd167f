use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Listing fields the extractor knows about. The label is the heading used on
/// the listing itself and doubles as the raw-record key.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum FieldKey {
    Address,
    Price,
    Layout,
    Area,
    YearBuilt,
    FloorInfo,
    Transportation,
    ManagementFee,
    RepairReserveFund,
    Direction,
    BalconyArea,
    CurrentSituation,
    Structure,
    TotalUnits,
    ManagementCompany,
    ManagementForm,
    LandRights,
    TransactionMode,
    InformationReleaseDate,
    NextScheduledUpdateDate,
    PropertyNumber,
    OtherFees,
    Parking,
}

impl FieldKey {
    pub const ALL: [FieldKey; 23] = [
        FieldKey::Address,
        FieldKey::Price,
        FieldKey::Layout,
        FieldKey::Area,
        FieldKey::YearBuilt,
        FieldKey::FloorInfo,
        FieldKey::Transportation,
        FieldKey::ManagementFee,
        FieldKey::RepairReserveFund,
        FieldKey::Direction,
        FieldKey::BalconyArea,
        FieldKey::CurrentSituation,
        FieldKey::Structure,
        FieldKey::TotalUnits,
        FieldKey::ManagementCompany,
        FieldKey::ManagementForm,
        FieldKey::LandRights,
        FieldKey::TransactionMode,
        FieldKey::InformationReleaseDate,
        FieldKey::NextScheduledUpdateDate,
        FieldKey::PropertyNumber,
        FieldKey::OtherFees,
        FieldKey::Parking,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            FieldKey::Address => "所在地",
            FieldKey::Price => "価格",
            FieldKey::Layout => "間取り",
            FieldKey::Area => "専有面積",
            FieldKey::YearBuilt => "築年月",
            FieldKey::FloorInfo => "階数",
            FieldKey::Transportation => "交通",
            FieldKey::ManagementFee => "管理費",
            FieldKey::RepairReserveFund => "修繕積立金",
            FieldKey::Direction => "向き",
            FieldKey::BalconyArea => "バルコニー",
            FieldKey::CurrentSituation => "現況",
            FieldKey::Structure => "建物構造",
            FieldKey::TotalUnits => "総戸数",
            FieldKey::ManagementCompany => "管理会社",
            FieldKey::ManagementForm => "管理形態",
            FieldKey::LandRights => "土地権利",
            FieldKey::TransactionMode => "取引態様",
            FieldKey::InformationReleaseDate => "更新日",
            FieldKey::NextScheduledUpdateDate => "次回更新予定",
            FieldKey::PropertyNumber => "物件番号",
            FieldKey::OtherFees => "その他費用",
            FieldKey::Parking => "駐車場",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|key| key.label() == label)
    }
}

/// Raw strings pulled out of the OCR text, in extraction order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldRecord {
    entries: Vec<(FieldKey, String)>,
}

impl FieldRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: FieldKey) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, key: FieldKey) -> bool {
        self.get(key).is_some()
    }

    /// Stores `value` unless the key is already populated. Returns whether the
    /// value was stored.
    pub fn insert_if_absent(&mut self, key: FieldKey, value: impl Into<String>) -> bool {
        if self.contains(key) {
            return false;
        }
        self.entries.push((key, value.into()));
        true
    }

    pub fn iter(&self) -> impl Iterator<Item = (FieldKey, &str)> {
        self.entries.iter().map(|(k, v)| (*k, v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(FieldKey, String)> for FieldRecord {
    fn from_iter<T: IntoIterator<Item = (FieldKey, String)>>(iter: T) -> Self {
        let mut record = FieldRecord::new();
        for (key, value) in iter {
            record.insert_if_absent(key, value);
        }
        record
    }
}

/// One OCR engine configuration: tesseract language pack(s) plus engine and
/// page-segmentation modes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OcrAttemptConfig {
    pub language: String,
    pub oem: u8,
    pub psm: u8,
}

impl OcrAttemptConfig {
    pub fn new(language: impl Into<String>, psm: u8) -> Self {
        Self {
            language: language.into(),
            oem: 3,
            psm,
        }
    }

    /// Single pass over the raw image with Japanese, English as fallback.
    pub fn simple_set() -> Vec<Self> {
        vec![Self::new("jpn", 6), Self::new("eng", 6)]
    }

    /// Horizontal Japanese at several segmentation modes, vertical Japanese,
    /// the combined pack, then English.
    pub fn improved_set() -> Vec<Self> {
        let mut configs: Vec<Self> = [6, 3, 4, 8, 11, 12, 13]
            .into_iter()
            .map(|psm| Self::new("jpn", psm))
            .collect();
        configs.push(Self::new("jpn_vert", 6));
        configs.push(Self::new("jpn_vert", 5));
        configs.push(Self::new("jpn+jpn_vert", 6));
        configs.push(Self::new("eng", 6));
        configs
    }

    pub fn label(&self) -> String {
        format!("{} (psm {})", self.language, self.psm)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrCandidate {
    pub variant: String,
    pub config: OcrAttemptConfig,
    pub text: String,
    pub score: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressParts {
    pub zipcode: Option<String>,
    /// Broad region (地方); fixed for this deployment.
    pub region: Option<String>,
    pub prefecture: Option<String>,
    pub city: Option<String>,
    pub ward: Option<String>,
}

/// Typed listing record. Free-text fields are empty strings when missing;
/// numeric and date fields are `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertyRecord {
    pub address: String,
    pub price: Option<i64>,
    pub price_per_square_meter: Option<i64>,
    pub layout: String,
    pub area: Option<f64>,
    pub year_built: Option<NaiveDate>,
    pub floor_info: String,
    pub transportation: String,
    pub management_fee: Option<i64>,
    pub repair_reserve_fund: Option<i64>,
    pub direction: String,
    pub balcony_area: Option<f64>,
    pub current_situation: String,
    pub structure: String,
    pub total_units: Option<i64>,
    pub management_company: String,
    pub management_form: String,
    pub land_rights: String,
    pub transaction_mode: String,
    pub information_release_date: Option<NaiveDate>,
    pub next_scheduled_update_date: Option<NaiveDate>,
    pub property_number: String,
    pub other_fees: String,
    pub parking: String,
    pub address_parts: AddressParts,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_round_trip_through_lookup() {
        for key in FieldKey::ALL {
            assert_eq!(FieldKey::from_label(key.label()), Some(key));
        }
        assert_eq!(FieldKey::from_label("駐輪場"), None);
    }

    #[test]
    fn first_insert_wins() {
        let mut record = FieldRecord::new();
        assert!(record.insert_if_absent(FieldKey::Price, "1,980万円"));
        assert!(!record.insert_if_absent(FieldKey::Price, "2,000万円"));
        assert_eq!(record.get(FieldKey::Price), Some("1,980万円"));
        assert_eq!(record.len(), 1);
    }

    #[test]
    fn improved_set_ends_with_latin_fallback() {
        let configs = OcrAttemptConfig::improved_set();
        assert_eq!(configs.len(), 11);
        assert_eq!(configs[0], OcrAttemptConfig::new("jpn", 6));
        assert_eq!(configs.last().map(|c| c.language.as_str()), Some("eng"));
    }
}
