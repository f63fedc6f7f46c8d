use crate::adapters::xlsx::XlsxEncoder;
use crate::config::ExportFormat;
use crate::domain::model::{Sheet, Workbook};
use crate::domain::ports::ArtifactEncoder;
use crate::utils::error::Result;
use std::io::Write;
use zip::write::{FileOptions, ZipWriter};

/// 每個工作表寫成一個 CSV，再打包成單一 ZIP
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvZipEncoder;

impl CsvZipEncoder {
    pub fn new() -> Self {
        Self
    }

    fn write_sheet<W: Write>(writer: W, sheet: &Sheet) -> Result<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        let columns = sheet.table.columns();

        // 沒有欄位時只留下空檔
        if !columns.is_empty() {
            csv_writer.write_record(columns)?;
            for index in 0..sheet.table.len() {
                csv_writer
                    .write_record(columns.iter().map(|column| sheet.table.cell(index, column)))?;
            }
        }

        csv_writer.flush()?;
        Ok(())
    }
}

impl ArtifactEncoder for CsvZipEncoder {
    fn extension(&self) -> &'static str {
        "zip"
    }

    fn encode(&self, workbook: &Workbook) -> Result<Vec<u8>> {
        let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));

        for sheet in &workbook.sheets {
            let entry = format!("{}.csv", sheet_file_name(&sheet.name));
            tracing::debug!("📄 Writing sheet '{}' ({} rows)", entry, sheet.table.len());
            zip.start_file::<_, ()>(entry, FileOptions::default())?;
            Self::write_sheet(&mut zip, sheet)?;
        }

        // 完成並取回底層 Vec<u8>
        let cursor = zip.finish()?;
        Ok(cursor.into_inner())
    }
}

/// 依配置選擇的編碼器
#[derive(Debug, Clone, Copy)]
pub enum WorkbookEncoder {
    Xlsx(XlsxEncoder),
    CsvZip(CsvZipEncoder),
}

impl WorkbookEncoder {
    pub fn for_format(format: ExportFormat) -> Self {
        match format {
            ExportFormat::Xlsx => Self::Xlsx(XlsxEncoder::new()),
            ExportFormat::CsvZip => Self::CsvZip(CsvZipEncoder::new()),
        }
    }
}

impl ArtifactEncoder for WorkbookEncoder {
    fn extension(&self) -> &'static str {
        match self {
            Self::Xlsx(encoder) => encoder.extension(),
            Self::CsvZip(encoder) => encoder.extension(),
        }
    }

    fn encode(&self, workbook: &Workbook) -> Result<Vec<u8>> {
        match self {
            Self::Xlsx(encoder) => encoder.encode(workbook),
            Self::CsvZip(encoder) => encoder.encode(workbook),
        }
    }
}

fn sheet_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' || c == ' ' {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        "Sheet".to_string()
    } else {
        cleaned.to_string()
    }
}
