//! 多值欄位 (services, industry) 的儲存格式。
//!
//! 資料庫裡存的是 JSON 陣列字串。舊資料可能是逗號分隔的純文字，
//! 解碼時 JSON 失敗就退回逗號切分。

/// 編碼成 JSON 陣列字串
pub fn encode_string_list(values: &[String]) -> String {
    // Vec<String> 序列化不會失敗
    serde_json::to_string(values).unwrap_or_else(|_| "[]".to_string())
}

/// 解碼 JSON 陣列字串，失敗時走舊格式相容路徑
pub fn decode_string_list(raw: &str) -> Vec<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }

    match serde_json::from_str::<Vec<String>>(trimmed) {
        Ok(values) => values,
        Err(_) => decode_legacy_list(trimmed),
    }
}

/// 舊格式: "UX Design, UI Design"
pub fn decode_legacy_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}
