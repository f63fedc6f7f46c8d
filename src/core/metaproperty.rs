use crate::domain::model::{MetapropertyMap, Table};
use crate::utils::format::yes_no;

pub const METAPROPERTY_SHEET: &str = "Metaproperties";
pub const OPTION_SHEET: &str = "Options";

const METAPROPERTY_COLUMNS: [&str; 8] = [
    "ID",
    "Name",
    "Label",
    "Type",
    "Multi-Select",
    "Required",
    "Filterable",
    "Total Options",
];

const OPTION_COLUMNS: [&str; 7] = [
    "ID",
    "Name",
    "Label",
    "Z-Index",
    "Count",
    "Metaproperty Name",
    "Metaproperty ID",
];

/// 兩張互相關聯的表：選項表以 Metaproperty ID 指回屬性表
#[derive(Debug, Clone)]
pub struct MetapropertyTables {
    pub metaproperties: Table,
    pub options: Table,
}

pub fn flatten_metaproperties(metaproperties: &MetapropertyMap) -> MetapropertyTables {
    let mut mp_table = Table::with_columns(METAPROPERTY_COLUMNS);
    let mut option_table = Table::with_columns(OPTION_COLUMNS);

    for (key, mp) in metaproperties {
        // map 的鍵唯一，選項一律以它連回屬性列
        let mp_id = key;
        if !mp.id.is_empty() && mp.id != *key {
            tracing::warn!("⚠️ Metaproperty '{}' carries id '{}', using the key", key, mp.id);
        }

        mp_table.push_row(cells(&METAPROPERTY_COLUMNS, [
            mp_id.clone(),
            mp.name.clone(),
            mp.label.clone(),
            mp.kind.clone(),
            yes_no(mp.is_multiselect).to_string(),
            yes_no(mp.is_required).to_string(),
            yes_no(mp.is_filterable).to_string(),
            mp.option_count().to_string(),
        ]));

        for option in &mp.options {
            option_table.push_row(cells(&OPTION_COLUMNS, [
                option.id.clone(),
                option.name.clone(),
                option.shown_label().to_string(),
                option.zindex.to_string(),
                option.media_count.to_string(),
                mp.name.clone(),
                mp_id.clone(),
            ]));
        }
    }

    tracing::debug!(
        "🔄 Flattened {} metaproperties with {} options",
        mp_table.len(),
        option_table.len()
    );

    MetapropertyTables {
        metaproperties: mp_table,
        options: option_table,
    }
}

fn cells<const N: usize>(columns: &[&str; N], values: [String; N]) -> Vec<(String, String)> {
    columns
        .iter()
        .map(|c| c.to_string())
        .zip(values)
        .collect()
}
