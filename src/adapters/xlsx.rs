use crate::domain::model::{Sheet, Workbook};
use crate::domain::ports::ArtifactEncoder;
use crate::utils::error::{EtlError, Result};
use rust_xlsxwriter::{Format, Worksheet};

/// 單一工作表的列數上限（含標題列）
pub const XLSX_MAX_ROWS: usize = 1_048_576;
const XLSX_MAX_COLUMNS: usize = 16_384;
const XLSX_MAX_CELL_CHARS: usize = 32_767;
const XLSX_MAX_SHEET_NAME: usize = 31;

/// 產生 Excel 活頁簿，每個工作表一個 sheet，標題列粗體
#[derive(Debug, Clone, Copy, Default)]
pub struct XlsxEncoder;

impl XlsxEncoder {
    pub fn new() -> Self {
        Self
    }

    fn write_sheet(worksheet: &mut Worksheet, sheet: &Sheet, header: &Format) -> Result<()> {
        let columns = sheet.table.columns();
        if sheet.table.len() >= XLSX_MAX_ROWS || columns.len() > XLSX_MAX_COLUMNS {
            return Err(EtlError::invalid_parameter(
                "limit",
                format!(
                    "sheet '{}' has {} rows and {} columns, beyond the spreadsheet limits",
                    sheet.name,
                    sheet.table.len(),
                    columns.len()
                ),
            ));
        }

        worksheet.set_name(worksheet_name(&sheet.name))?;

        for (col, column) in columns.iter().enumerate() {
            worksheet.write_string_with_format(0, col as u16, column.as_str(), header)?;
        }
        for index in 0..sheet.table.len() {
            for (col, column) in columns.iter().enumerate() {
                let value = sheet.table.cell(index, column);
                // 空白儲存格不寫入
                if !value.is_empty() {
                    worksheet.write_string((index + 1) as u32, col as u16, clip_cell(value))?;
                }
            }
        }
        Ok(())
    }
}

impl ArtifactEncoder for XlsxEncoder {
    fn extension(&self) -> &'static str {
        "xlsx"
    }

    fn encode(&self, workbook: &Workbook) -> Result<Vec<u8>> {
        let mut book = rust_xlsxwriter::Workbook::new();
        let header = Format::new().set_bold();

        for sheet in &workbook.sheets {
            tracing::debug!("📄 Writing worksheet '{}' ({} rows)", sheet.name, sheet.table.len());
            let worksheet = book.add_worksheet();
            Self::write_sheet(worksheet, sheet, &header)?;
        }

        Ok(book.save_to_buffer()?)
    }
}

/// Excel 不允許 `[]:*?/\`，名稱最多 31 字元
fn worksheet_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| match c {
            '[' | ']' | ':' | '*' | '?' | '/' | '\\' => '_',
            other => other,
        })
        .take(XLSX_MAX_SHEET_NAME)
        .collect();
    let cleaned = cleaned.trim().trim_matches('\'');
    if cleaned.is_empty() {
        "Sheet".to_string()
    } else {
        cleaned.to_string()
    }
}

fn clip_cell(value: &str) -> &str {
    match value.char_indices().nth(XLSX_MAX_CELL_CHARS) {
        Some((cut, _)) => &value[..cut],
        None => value,
    }
}
