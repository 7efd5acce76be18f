//! 公共常量和辅助函数

use chrono::{Local, NaiveDate, Utc};
use chrono_tz::Tz;

/// 东方财富涨停池接口 ut 参数
pub const EM_ZT_POOL_UT: &str = "7eea3edcaed734bea9cbfc24409ed989";
/// 浏览器 User-Agent
pub const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// 当前日期，指定时区时按该时区计算，否则使用本机时区
pub fn today(tz: Option<Tz>) -> NaiveDate {
    match tz {
        Some(tz) => Utc::now().with_timezone(&tz).date_naive(),
        None => Local::now().date_naive(),
    }
}

/// 日期格式化为 YYYYMMDD
pub fn compact_date(date: NaiveDate) -> String {
    date.format("%Y%m%d").to_string()
}

/// 将 HHMMSS 形式的整数时间转换为 HH:MM:SS，如 92500 -> 09:25:00
pub fn format_seal_time(raw: i64) -> String {
    let padded = format!("{:06}", raw);
    format!("{}:{}:{}", &padded[0..2], &padded[2..4], &padded[4..6])
}

/// 保留两位小数，恰好居中时取偶数
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}
