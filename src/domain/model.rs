use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

/// 上游的單筆資料，欄位順序與上游文件相同
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    pub data: serde_json::Map<String, serde_json::Value>,
}

impl Record {
    pub fn new(data: serde_json::Map<String, serde_json::Value>) -> Self {
        Self { data }
    }

    /// 只接受 JSON 物件，其他型別回傳 None
    pub fn from_value(value: serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Object(data) => Some(Self { data }),
            _ => None,
        }
    }

    pub fn get(&self, field: &str) -> Option<&serde_json::Value> {
        self.data.get(field)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    Flag(bool),
    Text(String),
}

impl FilterValue {
    /// 空字串視為「未指定」
    pub fn is_blank(&self) -> bool {
        matches!(self, FilterValue::Text(s) if s.trim().is_empty())
    }
}

impl fmt::Display for FilterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterValue::Flag(flag) => write!(f, "{}", flag),
            FilterValue::Text(text) => write!(f, "{}", text),
        }
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        FilterValue::Text(value.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        FilterValue::Text(value)
    }
}

impl From<bool> for FilterValue {
    fn from(value: bool) -> Self {
        FilterValue::Flag(value)
    }
}

pub type Filters = BTreeMap<String, FilterValue>;

/// 單次上游分頁請求
#[derive(Debug, Clone, PartialEq)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
    pub include_total: bool,
    pub filters: Filters,
}

pub type Row = HashMap<String, String>;

/// 扁平化後的表格：欄位依首次出現順序排列
#[derive(Debug, Clone, Default)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Row>,
    seen: HashSet<String>,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    /// 固定欄位的表格
    pub fn with_columns<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut table = Self::new();
        for column in columns {
            table.register_column(column.into());
        }
        table
    }

    fn register_column(&mut self, column: String) {
        if self.seen.insert(column.clone()) {
            self.columns.push(column);
        }
    }

    /// 依序加入一列；沒出現過的欄位會追加在最後。
    /// 同一列重複的欄位名稱以最後一個值為準
    pub fn push_row(&mut self, cells: Vec<(String, String)>) {
        let mut row = Row::with_capacity(cells.len());
        for (column, value) in cells {
            self.register_column(column.clone());
            row.insert(column, value);
        }
        self.rows.push(row);
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// 缺少的儲存格回傳空字串
    pub fn cell(&self, row: usize, column: &str) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .map(String::as_str)
            .unwrap_or("")
    }
}

#[derive(Debug, Clone)]
pub struct Sheet {
    pub name: String,
    pub table: Table,
}

/// 一份輸出檔案，可以包含多個具名工作表
#[derive(Debug, Clone, Default)]
pub struct Workbook {
    pub sheets: Vec<Sheet>,
}

impl Workbook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sheet(mut self, name: impl Into<String>, table: Table) -> Self {
        self.sheets.push(Sheet {
            name: name.into(),
            table,
        });
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metaproperty {
    #[serde(default, deserialize_with = "flexible_string")]
    pub id: String,
    #[serde(default, deserialize_with = "flexible_string")]
    pub name: String,
    #[serde(default, deserialize_with = "flexible_string")]
    pub label: String,
    #[serde(rename = "type", default, deserialize_with = "flexible_string")]
    pub kind: String,
    #[serde(default, deserialize_with = "flexible_bool")]
    pub is_multiselect: bool,
    #[serde(default, deserialize_with = "flexible_bool")]
    pub is_required: bool,
    #[serde(default, deserialize_with = "flexible_bool")]
    pub is_filterable: bool,
    #[serde(default)]
    pub options: Vec<MetapropertyOption>,
}

impl Metaproperty {
    pub fn option_count(&self) -> usize {
        self.options.len()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetapropertyOption {
    #[serde(default, deserialize_with = "flexible_string")]
    pub id: String,
    #[serde(default, deserialize_with = "flexible_string")]
    pub name: String,
    #[serde(default, deserialize_with = "flexible_string")]
    pub label: String,
    #[serde(default, deserialize_with = "flexible_string")]
    pub display_label: String,
    #[serde(default, deserialize_with = "flexible_i64")]
    pub zindex: i64,
    #[serde(default, deserialize_with = "flexible_u64")]
    pub media_count: u64,
}

impl MetapropertyOption {
    /// 優先使用 displayLabel
    pub fn shown_label(&self) -> &str {
        if self.display_label.is_empty() {
            &self.label
        } else {
            &self.display_label
        }
    }
}

pub type MetapropertyMap = BTreeMap<String, Metaproperty>;

/// 上游旗標可能是 true/false、0/1 或 "1"
fn flexible_bool<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Bool(b) => b,
        serde_json::Value::Number(n) => n.as_f64().map(|n| n != 0.0).unwrap_or(false),
        serde_json::Value::String(s) => matches!(s.trim(), "1" | "true" | "True" | "TRUE"),
        _ => false,
    })
}

/// 非字串（例如多語系物件）一律視為空字串
fn flexible_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Number(n) => n.to_string(),
        _ => String::new(),
    })
}

fn flexible_i64<'de, D>(deserializer: D) -> std::result::Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Number(n) => n.as_i64().unwrap_or_default(),
        serde_json::Value::String(s) => s.trim().parse().unwrap_or_default(),
        _ => 0,
    })
}

fn flexible_u64<'de, D>(deserializer: D) -> std::result::Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Number(n) => n.as_u64().unwrap_or_default(),
        serde_json::Value::String(s) => s.trim().parse().unwrap_or_default(),
        _ => 0,
    })
}

/// 匯出成功後回給呼叫端的檔案資訊
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportArtifact {
    pub total_items: usize,
    pub download_url: String,
    pub filename: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExportOutcome {
    Created(ExportArtifact),
    /// 沒有資料可匯出，不是錯誤
    Empty,
}
