use crate::core::model::AddressParts;

/// Region every listing handled by this tool belongs to.
pub const DEFAULT_REGION: &str = "関東地方";

/// Prefectures whose suffix is not 県.
const SPECIAL_PREFECTURES: [&str; 4] = ["東京都", "北海道", "大阪府", "京都府"];

/// Splits an address into hierarchy levels. Each level is the prefix up to
/// and including the first occurrence of its suffix, found independently of
/// the others; combinations are not cross-checked.
pub fn decompose_address(address: &str) -> AddressParts {
    let address = address.trim();
    if address.is_empty() {
        return AddressParts::default();
    }

    let prefecture = SPECIAL_PREFECTURES
        .iter()
        .find(|name| address.starts_with(*name))
        .map(|name| name.to_string())
        .or_else(|| prefix_through(address, '県'));

    AddressParts {
        zipcode: None,
        region: Some(DEFAULT_REGION.to_string()),
        prefecture,
        city: prefix_through(address, '市'),
        ward: prefix_through(address, '区'),
    }
}

fn prefix_through(address: &str, suffix: char) -> Option<String> {
    let idx = address.find(suffix)?;
    if idx == 0 {
        return None;
    }
    Some(address[..idx + suffix.len_utf8()].to_string())
}
