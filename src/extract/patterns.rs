//! Field pattern tables.
//!
//! Tables are plain data: each field lists regexes in priority order. A rule
//! with one capture group yields that group, several groups are concatenated
//! (so a number and its unit travel together), no group yields the whole
//! match. Text is matched after line breaks have been flattened to spaces, so
//! a labelled value runs until the next `label:` token or the end of the text.

use once_cell::sync::Lazy;
use regex::{Captures, Regex, RegexBuilder};

use crate::core::model::FieldKey;

#[derive(Debug, Clone)]
pub struct FieldRule {
    pub key: FieldKey,
    pub patterns: Vec<Regex>,
}

impl FieldRule {
    fn new(key: FieldKey, patterns: &[&str]) -> Self {
        let patterns = patterns
            .iter()
            .map(|pattern| {
                RegexBuilder::new(pattern)
                    .case_insensitive(true)
                    .build()
                    .expect("invalid field pattern")
            })
            .collect();
        Self { key, patterns }
    }

    /// First non-blank value produced by the highest-priority matching pattern.
    pub fn first_match(&self, text: &str) -> Option<String> {
        self.patterns.iter().find_map(|pattern| {
            pattern
                .captures_iter(text)
                .map(|caps| captured_value(&caps))
                .map(|value| value.trim().to_string())
                .find(|value| !value.is_empty())
        })
    }
}

fn captured_value(caps: &Captures<'_>) -> String {
    match caps.len() {
        1 => caps[0].to_string(),
        2 => caps.get(1).map(|m| m.as_str()).unwrap_or_default().to_string(),
        _ => caps
            .iter()
            .skip(1)
            .flatten()
            .map(|m| m.as_str())
            .collect(),
    }
}

#[derive(Debug, Clone)]
pub struct PatternTable {
    name: &'static str,
    rules: Vec<FieldRule>,
}

impl PatternTable {
    pub fn new(name: &'static str, rules: Vec<FieldRule>) -> Self {
        Self { name, rules }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn rules(&self) -> &[FieldRule] {
        &self.rules
    }

    /// Label-anchored rules only, plus bare price/area/layout fallbacks.
    pub fn simple() -> Self {
        SIMPLE.clone()
    }

    /// Label rules backed by unlabeled fallbacks for the core fields.
    pub fn improved() -> Self {
        IMPROVED.clone()
    }
}

/// Fields both tables read the same way.
fn shared_rules() -> Vec<FieldRule> {
    vec![
        FieldRule::new(FieldKey::Direction, &[r"向き[：:\s]*(\S.*?)(?:\s+\S+?[：:]|$)"]),
        FieldRule::new(
            FieldKey::BalconyArea,
            &[
                r"バルコニー(?:面積)?[：:\s]*([0-9０-９][0-9０-９,，.．]*)\s*(㎡|m²|m2)",
                r"バルコニー(?:面積)?[：:\s]*(\S.*?)(?:\s+\S+?[：:]|$)",
            ],
        ),
        FieldRule::new(FieldKey::CurrentSituation, &[r"現況[：:\s]*(\S.*?)(?:\s+\S+?[：:]|$)"]),
        FieldRule::new(FieldKey::Structure, &[r"建物構造[：:\s]*(\S.*?)(?:\s+\S+?[：:]|$)"]),
        FieldRule::new(
            FieldKey::TotalUnits,
            &[r"総戸数[：:\s]*([0-9０-９]+)\s*(戸)", r"総戸数[：:\s]*(\S.*?)(?:\s+\S+?[：:]|$)"],
        ),
        FieldRule::new(
            FieldKey::ManagementCompany,
            &[r"管理会社[：:\s]*(\S.*?)(?:\s+\S+?[：:]|$)"],
        ),
        FieldRule::new(FieldKey::ManagementForm, &[r"管理形態[：:\s]*(\S.*?)(?:\s+\S+?[：:]|$)"]),
        FieldRule::new(FieldKey::LandRights, &[r"土地権利[：:\s]*(\S.*?)(?:\s+\S+?[：:]|$)"]),
        FieldRule::new(FieldKey::TransactionMode, &[r"取引態様[：:\s]*(\S.*?)(?:\s+\S+?[：:]|$)"]),
        FieldRule::new(
            FieldKey::InformationReleaseDate,
            &[
                r"(?:情報)?更新日[：:\s]*([0-9０-９]{4}年[0-9０-９]{1,2}月[0-9０-９]{1,2}日)",
                r"(?:情報)?更新日[：:\s]*(\S.*?)(?:\s+\S+?[：:]|$)",
            ],
        ),
        FieldRule::new(
            FieldKey::NextScheduledUpdateDate,
            &[
                r"次回更新予定日?[：:\s]*([0-9０-９]{4}年[0-9０-９]{1,2}月[0-9０-９]{1,2}日)",
                r"次回更新予定日?[：:\s]*(\S.*?)(?:\s+\S+?[：:]|$)",
            ],
        ),
        FieldRule::new(FieldKey::PropertyNumber, &[r"物件番号[：:\s]*(\S.*?)(?:\s+\S+?[：:]|$)"]),
        FieldRule::new(FieldKey::OtherFees, &[r"その他費用[：:\s]*(\S.*?)(?:\s+\S+?[：:]|$)"]),
        FieldRule::new(FieldKey::Parking, &[r"駐車場[：:\s]*(\S.*?)(?:\s+\S+?[：:]|$)"]),
    ]
}

static SIMPLE: Lazy<PatternTable> = Lazy::new(|| {
    let mut rules = vec![
        FieldRule::new(FieldKey::Address, &[r"所在地[：:\s]*(\S.*?)(?:\s+\S+?[：:]|$)"]),
        FieldRule::new(
            FieldKey::Price,
            &[
                r"価格[：:\s]*(\S+?)(万円)",
                r"(\d+(?:,\d+)*(?:\.\d+)?)(万円)",
            ],
        ),
        FieldRule::new(FieldKey::Transportation, &[r"交通[：:\s]*(\S.*?駅)"]),
        FieldRule::new(FieldKey::RepairReserveFund, &[r"修繕積立金[：:\s]*(\S+?円)"]),
        FieldRule::new(
            FieldKey::Layout,
            &[r"間取り[：:\s]*(\S.*?)(?:\s+\S+?[：:]|$)", r"(\d+(?:S?LDK|DK|K|R))"],
        ),
        FieldRule::new(
            FieldKey::Area,
            &[
                r"専有面積[：:\s]*([0-9０-９][0-9０-９,，.．]*)\s*(㎡|m²|m2)",
                r"(\d+(?:\.\d+)?)(㎡|m²)",
            ],
        ),
        FieldRule::new(FieldKey::YearBuilt, &[r"築年月[：:\s]*([0-9０-９]{4}年[0-9０-９]{1,2}月)"]),
        FieldRule::new(FieldKey::FloorInfo, &[r"階数[／/]?構造[：:\s]*(\S+?階)"]),
    ];
    rules.extend(shared_rules());
    PatternTable::new("simple", rules)
});

static IMPROVED: Lazy<PatternTable> = Lazy::new(|| {
    let mut rules = vec![
        FieldRule::new(
            FieldKey::Price,
            &[
                r"価格[：:\s]*([0-9０-９][0-9０-９,，.．]*)\s*(万円)",
                r"([0-9０-９][0-9０-９,，.．]*)\s*(万円)",
                r"価格[：:\s]*(\S+?)(万円)",
                r"価格[：:\s]*([0-9０-９,，]+)\s*(円)",
            ],
        ),
        FieldRule::new(
            FieldKey::Address,
            &[
                r"所在地[：:\s]*(\S.*?)(?:\s+\S+?[：:]|$)",
                r"住所[：:\s]*(\S.*?)(?:\s+\S+?[：:]|$)",
                r"(?:東京都|神奈川県|埼玉県|千葉県|大阪府|京都府|兵庫県|愛知県|福岡県|北海道)\S*?[市区町村]\S*?[0-9０-９]+(?:\S*?[0-9０-９]+){0,2}",
            ],
        ),
        FieldRule::new(
            FieldKey::Layout,
            &[
                r"間取り?[：:\s]*([0-9０-９]+\s*(?:S?LDK|S?DK|K|R))",
                r"([0-9０-９]+(?:S?LDK|S?DK))",
                r"間取り[：:\s]*(\S.*?)(?:\s+\S+?[：:]|$)",
            ],
        ),
        FieldRule::new(
            FieldKey::Area,
            &[
                r"専有面積[：:\s]*([0-9０-９][0-9０-９,，.．]*)\s*(㎡|m²|m2)",
                r"([0-9０-９][0-9０-９,，.．]*)\s*(㎡|m²)",
                r"面積[：:\s]*([0-9０-９][0-9０-９,，.．]*)",
            ],
        ),
        FieldRule::new(
            FieldKey::YearBuilt,
            &[
                r"築年月[：:\s]*([0-9０-９]{4}年[0-9０-９]{1,2}月)",
                r"([0-9０-９]{4}年[0-9０-９]{1,2}月)築",
                r"築[：:\s]*([0-9０-９]{4}年)",
            ],
        ),
        FieldRule::new(
            FieldKey::FloorInfo,
            &[
                r"(?:所在階|階数)(?:[／/]構造)?[：:\s]*([0-9０-９]+階(?:[／/]\S*?[0-9０-９]+階建?)?)",
                r"([0-9０-９]+階)",
            ],
        ),
        FieldRule::new(
            FieldKey::Transportation,
            &[
                r"交通[：:\s]*(\S.*?(?:徒歩|バス)\s*[0-9０-９]+\s*分)",
                r"(\S*駅\S*\s*徒歩\s*[0-9０-９]+\s*分)",
                r"最寄り?駅[：:\s]*(\S.*?)(?:\s+\S+?[：:]|$)",
                r"交通[：:\s]*(\S.*?)(?:\s+\S+?[：:]|$)",
            ],
        ),
        FieldRule::new(
            FieldKey::ManagementFee,
            &[
                r"管理費[：:\s]*([0-9０-９,，]+)\s*(円)",
                r"([0-9０-９,，]+)\s*(円)\s*/\s*月",
            ],
        ),
        FieldRule::new(
            FieldKey::RepairReserveFund,
            &[
                r"修繕積立金[：:\s]*([0-9０-９,，]+)\s*(円)",
                r"修繕費[：:\s]*([0-9０-９,，]+)",
            ],
        ),
    ];
    rules.extend(shared_rules());
    PatternTable::new("improved", rules)
});
