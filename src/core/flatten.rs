use crate::domain::model::{Record, Table};
use crate::utils::format::format_bytes;
use serde::{Deserialize, Serialize};
use serde_json::Value;

const JOIN_SEPARATOR: &str = ", ";

/// 欄位名稱比對方式
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldMatcher {
    Prefix(String),
    Exact(String),
}

impl FieldMatcher {
    pub fn matches(&self, field: &str) -> bool {
        match self {
            FieldMatcher::Prefix(prefix) => field.starts_with(prefix.as_str()),
            FieldMatcher::Exact(name) => field == name,
        }
    }
}

/// 特定欄位的格式化規則
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRule {
    /// 多值屬性欄位：陣列合併、物件轉 JSON
    PropertyValues,
    /// 位元組數轉成易讀大小
    ByteSize,
    /// 陣列合併成逗號分隔字串
    JoinedList,
    /// 展開成 `<field>_<key>` 欄位
    ExpandMap,
}

/// 可由設定檔調整的欄位名單
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldRules {
    pub property_prefixes: Vec<String>,
    pub byte_size_fields: Vec<String>,
    pub list_fields: Vec<String>,
    pub map_fields: Vec<String>,
}

impl Default for FieldRules {
    fn default() -> Self {
        Self {
            property_prefixes: vec!["property_".to_string()],
            byte_size_fields: vec!["fileSize".to_string()],
            list_fields: vec!["tags".to_string()],
            map_fields: vec!["thumbnails".to_string()],
        }
    }
}

/// 依優先順序排列的 (比對, 規則) 表，第一個符合的規則生效
#[derive(Debug, Clone)]
pub struct FieldClassifier {
    rules: Vec<(FieldMatcher, FieldRule)>,
}

impl FieldClassifier {
    pub fn new(rules: Vec<(FieldMatcher, FieldRule)>) -> Self {
        Self { rules }
    }

    pub fn from_rules(config: &FieldRules) -> Self {
        let prefixes = config
            .property_prefixes
            .iter()
            .map(|p| (FieldMatcher::Prefix(p.clone()), FieldRule::PropertyValues));
        let sizes = config
            .byte_size_fields
            .iter()
            .map(|f| (FieldMatcher::Exact(f.clone()), FieldRule::ByteSize));
        let lists = config
            .list_fields
            .iter()
            .map(|f| (FieldMatcher::Exact(f.clone()), FieldRule::JoinedList));
        let maps = config
            .map_fields
            .iter()
            .map(|f| (FieldMatcher::Exact(f.clone()), FieldRule::ExpandMap));

        Self::new(prefixes.chain(sizes).chain(lists).chain(maps).collect())
    }

    pub fn classify(&self, field: &str) -> Option<FieldRule> {
        self.rules
            .iter()
            .find(|(matcher, _)| matcher.matches(field))
            .map(|(_, rule)| *rule)
    }
}

impl Default for FieldClassifier {
    fn default() -> Self {
        Self::from_rules(&FieldRules::default())
    }
}

/// 把結構不一的 JSON 記錄攤平成表格
#[derive(Debug, Clone, Default)]
pub struct TabularFlattener {
    classifier: FieldClassifier,
}

impl TabularFlattener {
    pub fn new(classifier: FieldClassifier) -> Self {
        Self { classifier }
    }

    pub fn flatten(&self, records: &[Record]) -> Table {
        let mut table = Table::new();
        for record in records {
            table.push_row(self.flatten_record(record));
        }
        tracing::debug!(
            "🔄 Flattened {} records into {} columns",
            table.len(),
            table.columns().len()
        );
        table
    }

    /// 展開出的 `<field>_<key>` 可能與既有欄位同名，此時以欄位順序中較後者為準
    pub fn flatten_record(&self, record: &Record) -> Vec<(String, String)> {
        let mut cells = Vec::with_capacity(record.data.len());

        for (field, value) in &record.data {
            if value.is_null() {
                cells.push((field.clone(), String::new()));
                continue;
            }

            match (self.classifier.classify(field), value) {
                (Some(FieldRule::PropertyValues), _) => {
                    cells.push((field.clone(), property_cell(value)));
                }
                (Some(FieldRule::ByteSize), _) => {
                    cells.push((field.clone(), format_bytes(value)));
                }
                (Some(FieldRule::JoinedList), Value::Array(items)) => {
                    cells.push((field.clone(), join_values(items)));
                }
                (Some(FieldRule::ExpandMap), Value::Object(entries)) => {
                    for (key, sub_value) in entries {
                        cells.push((synthetic_column(field, key), display_value(sub_value)));
                    }
                }
                _ => generic_cells(field, value, &mut cells),
            }
        }

        cells
    }
}

/// 沒有特定規則的欄位
fn generic_cells(field: &str, value: &Value, cells: &mut Vec<(String, String)>) {
    match value {
        // 只展開一層，更深的物件轉成 JSON 字串
        Value::Object(entries) => {
            for (key, sub_value) in entries {
                let cell = match sub_value {
                    Value::Array(items) => join_values(items),
                    other => display_value(other),
                };
                cells.push((synthetic_column(field, key), cell));
            }
        }
        Value::Array(items) => cells.push((field.to_string(), join_values(items))),
        other => cells.push((field.to_string(), display_value(other))),
    }
}

fn property_cell(value: &Value) -> String {
    match value {
        Value::Array(items) => join_values(items),
        other => display_value(other),
    }
}

fn synthetic_column(field: &str, key: &str) -> String {
    format!("{}_{}", field, key)
}

fn join_values(items: &[Value]) -> String {
    items
        .iter()
        .map(display_value)
        .collect::<Vec<_>>()
        .join(JOIN_SEPARATOR)
}

/// 字串不加引號，陣列與物件輸出精簡 JSON
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}
