use crate::utils::error::{AppError, FieldError, Result};
use std::collections::HashSet;

/// 新成員排在最後: 空集合為 0，否則為 max + 1
pub fn next_order(current_max: Option<i64>) -> i64 {
    current_max.map(|max| max + 1).unwrap_or(0)
}

/// 檢查送出的 id 列表是否為目前集合的完整排列
///
/// 每個現有 id 必須剛好出現一次，不能有未知 id。
pub fn check_permutation(current: &[String], submitted: &[String]) -> Result<()> {
    let known: HashSet<&str> = current.iter().map(String::as_str).collect();
    let mut seen: HashSet<&str> = HashSet::with_capacity(submitted.len());
    let mut errors = Vec::new();

    for id in submitted {
        if !known.contains(id.as_str()) {
            errors.push(FieldError::new("ids", format!("unknown id '{}'", id)));
        } else if !seen.insert(id.as_str()) {
            errors.push(FieldError::new("ids", format!("duplicate id '{}'", id)));
        }
    }

    let missing: Vec<&str> = current
        .iter()
        .map(String::as_str)
        .filter(|id| !seen.contains(id))
        .collect();
    if !missing.is_empty() {
        errors.push(FieldError::new(
            "ids",
            format!("missing ids: {}", missing.join(", ")),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::ValidationError { errors })
    }
}

/// 把 from 位置的元素移到 to 位置，越界或原地不動回傳 None
pub fn move_item<T: Clone>(items: &[T], from: usize, to: usize) -> Option<Vec<T>> {
    if from == to || from >= items.len() || to >= items.len() {
        return None;
    }
    let mut reordered = items.to_vec();
    let moved = reordered.remove(from);
    reordered.insert(to, moved);
    Some(reordered)
}
