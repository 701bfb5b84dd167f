use crate::core::model::FieldKey;

/// Alternate headings, kana readings and common OCR-friendly spellings.
const SYNONYMS: &[(&str, FieldKey)] = &[
    ("かかく", FieldKey::Price),
    ("販売価格", FieldKey::Price),
    ("しょざいち", FieldKey::Address),
    ("住所", FieldKey::Address),
    ("じゅうしょ", FieldKey::Address),
    ("まどり", FieldKey::Layout),
    ("間取", FieldKey::Layout),
    ("面積", FieldKey::Area),
    ("せんゆうめんせき", FieldKey::Area),
    ("築年", FieldKey::YearBuilt),
    ("ちくねんげつ", FieldKey::YearBuilt),
    ("建築年月", FieldKey::YearBuilt),
    ("完成時期", FieldKey::YearBuilt),
    ("所在階", FieldKey::FloorInfo),
    ("所在階/構造", FieldKey::FloorInfo),
    ("階数/構造", FieldKey::FloorInfo),
    ("アクセス", FieldKey::Transportation),
    ("最寄駅", FieldKey::Transportation),
    ("最寄り駅", FieldKey::Transportation),
    ("修繕費", FieldKey::RepairReserveFund),
    ("方角", FieldKey::Direction),
    ("主要採光面", FieldKey::Direction),
    ("バルコニー面積", FieldKey::BalconyArea),
    ("構造", FieldKey::Structure),
    ("構造・工法", FieldKey::Structure),
    ("敷地の権利形態", FieldKey::LandRights),
    ("情報更新日", FieldKey::InformationReleaseDate),
    ("情報公開日", FieldKey::InformationReleaseDate),
    ("次回更新予定日", FieldKey::NextScheduledUpdateDate),
    ("諸費用", FieldKey::OtherFees),
];

/// Maps a line-scan key to its field. Canonical headings map to themselves;
/// anything outside the vocabulary is `None`.
pub fn canonical_field(key: &str) -> Option<FieldKey> {
    let key = key.trim();
    FieldKey::from_label(key).or_else(|| {
        SYNONYMS
            .iter()
            .find(|(synonym, _)| *synonym == key)
            .map(|(_, field)| *field)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_labels_and_readings() {
        assert_eq!(canonical_field("価格"), Some(FieldKey::Price));
        assert_eq!(canonical_field("かかく"), Some(FieldKey::Price));
        assert_eq!(canonical_field(" 住所 "), Some(FieldKey::Address));
        assert_eq!(canonical_field("築年"), Some(FieldKey::YearBuilt));
        assert_eq!(canonical_field("面積"), Some(FieldKey::Area));
    }

    #[test]
    fn unknown_keys_are_dropped() {
        assert_eq!(canonical_field("ペット"), None);
        assert_eq!(canonical_field(""), None);
    }
}
