use serde_json::Value;

const SIZE_UNITS: [&str; 5] = ["Bytes", "KB", "MB", "GB", "TB"];

/// 將位元組數轉成易讀大小，例如 1536 -> "1.5 KB"
///
/// 非數值（或 null）回傳空字串。數字字串也接受。
pub fn format_bytes(value: &Value) -> String {
    let bytes = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    match bytes {
        Some(bytes) if bytes.is_finite() => human_size(bytes),
        _ => String::new(),
    }
}

fn human_size(bytes: f64) -> String {
    if bytes == 0.0 {
        return "0 Bytes".to_string();
    }

    let mut size = bytes;
    let mut unit = 0;
    while size >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }

    // f64 的 Display 會省略多餘的 0（1.50 -> 1.5，1.00 -> 1）
    let rounded = (size * 100.0).round() / 100.0;
    format!("{} {}", rounded, SIZE_UNITS[unit])
}

pub fn yes_no(flag: bool) -> &'static str {
    if flag {
        "Yes"
    } else {
        "No"
    }
}
