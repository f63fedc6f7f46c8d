use regex::Regex;
use std::sync::LazyLock;

static PROTOCOL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z][a-zA-Z0-9+.-]*://").expect("valid protocol regex"));
static SEPARATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[._\s]+").expect("valid separator regex"));
static DISALLOWED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9-]").expect("valid charset regex"));
static DASH_RUNS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"-{2,}").expect("valid dash regex"));

/// 由長到短排列，先比對較長的後綴
const KNOWN_SUFFIXES: &[&str] = &[
    ".getbynder.com",
    ".bynder.com",
    ".co.uk",
    ".com",
    ".net",
    ".org",
    ".io",
    ".eu",
    ".de",
    ".nl",
];

const FALLBACK: &str = "unknown";

/// 把網域類字串轉成可用於檔名的 slug
///
/// `"https://My-Portal.getbynder.com/"` -> `"my-portal"`，空值回傳 `"unknown"`。
pub fn slugify(input: Option<&str>) -> String {
    let raw = match input.map(str::trim) {
        Some(value) if !value.is_empty() => value,
        _ => return FALLBACK.to_string(),
    };

    let without_protocol = PROTOCOL.replace(raw, "");
    let host = without_protocol
        .split(['/', '?', '#'])
        .next()
        .unwrap_or_default();
    // 去掉 port
    let host = host.split(':').next().unwrap_or_default().to_lowercase();

    let trimmed = KNOWN_SUFFIXES
        .iter()
        .find_map(|suffix| host.strip_suffix(suffix))
        .unwrap_or(&host);

    let dashed = SEPARATORS.replace_all(trimmed, "-");
    let cleaned = DISALLOWED.replace_all(&dashed, "");
    let collapsed = DASH_RUNS.replace_all(&cleaned, "-");
    let slug = collapsed.trim_matches('-');

    if slug.is_empty() {
        FALLBACK.to_string()
    } else {
        slug.to_string()
    }
}
