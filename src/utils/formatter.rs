// Formatters - 파일 크기, 날짜 포맷팅

use chrono::{DateTime, Local};
use std::time::SystemTime;

const SIZE_UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];

/// 파일 크기를 읽기 쉬운 형식으로 포맷팅 (항상 소수점 1자리)
///
/// 1024로 나누다가 1024 미만이 되면 멈춥니다. GB를 넘으면 TB로 표시합니다.
///
/// # Examples
/// ```
/// use dualpilot::utils::formatter::format_size;
///
/// assert_eq!(format_size(0), "0.0 B");
/// assert_eq!(format_size(512), "512.0 B");
/// assert_eq!(format_size(1536), "1.5 KB");
/// assert_eq!(format_size(1_048_576), "1.0 MB");
/// ```
pub fn format_size(bytes: u64) -> String {
    let mut size = bytes as f64;
    for unit in SIZE_UNITS {
        if size < 1024.0 {
            return format!("{:.1} {}", size, unit);
        }
        size /= 1024.0;
    }
    format!("{:.1} TB", size)
}

/// 시스템 시간을 통일된 날짜 형식으로 포맷팅
///
/// 항상 "YYYY-MM-DD HH:MM" 형식 (16자 고정)
pub fn format_date(time: SystemTime) -> String {
    let datetime: DateTime<Local> = time.into();
    datetime.format("%Y-%m-%d %H:%M").to_string()
}

/// 히스토리 타임스탬프 포맷팅 ("YYYY-MM-DD HH:MM:SS")
pub fn format_timestamp(time: &DateTime<Local>) -> String {
    time.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// 개수에 따라 단수/복수형 반환
///
/// # Examples
/// ```
/// use dualpilot::utils::formatter::pluralize;
///
/// assert_eq!(pluralize(1, "item", "items"), "1 item");
/// assert_eq!(pluralize(3, "item", "items"), "3 items");
/// ```
pub fn pluralize(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("{} {}", count, singular)
    } else {
        format!("{} {}", count, plural)
    }
}
