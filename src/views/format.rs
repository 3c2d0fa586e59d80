//! Display formatting helpers

use chrono::{Datelike, NaiveDate};

const SIZE_UNITS: [&str; 4] = ["Б", "КБ", "МБ", "ГБ"];

const MONTHS_GENITIVE: [&str; 12] = [
    "января", "февраля", "марта", "апреля", "мая", "июня", "июля", "августа", "сентября",
    "октября", "ноября", "декабря",
];

const MONTHS_NOMINATIVE: [&str; 12] = [
    "Январь", "Февраль", "Март", "Апрель", "Май", "Июнь", "Июль", "Август", "Сентябрь",
    "Октябрь", "Ноябрь", "Декабрь",
];

/// Human-readable file size in powers of 1024 with one decimal.
///
/// Absent and zero sizes render as an empty string. Anything past gigabytes
/// stays in ГБ.
pub fn format_file_size(bytes: Option<i64>) -> String {
    let bytes = match bytes {
        Some(b) if b > 0 => b,
        _ => return String::new(),
    };

    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }

    format!("{:.1} {}", size, SIZE_UNITS[unit])
}

/// "15 марта 2025"
pub fn format_date(date: NaiveDate) -> String {
    format!(
        "{} {} {}",
        date.day(),
        MONTHS_GENITIVE[date.month0() as usize],
        date.year()
    )
}

/// "Март 2025"
pub fn month_title(year: i32, month: u32) -> String {
    let name = MONTHS_NOMINATIVE
        .get(month.saturating_sub(1) as usize)
        .copied()
        .unwrap_or("");
    format!("{} {}", name, year)
}
