//! 交易日推算
//!
//! 默认规则为“昨天”，不查询交易日历，周末和节假日也照常返回前一天

use chrono::{Days, NaiveDate};

/// 交易日推算器
///
/// 可替换为基于交易日历的实现
pub trait TradeDateResolver {
    /// 根据当天日期推算需要查询的交易日
    fn resolve_target_date(&self, today: NaiveDate) -> NaiveDate;
}

/// 简单规则：当天的前一天
#[derive(Debug, Clone, Copy, Default)]
pub struct NaiveYesterday;

impl TradeDateResolver for NaiveYesterday {
    fn resolve_target_date(&self, today: NaiveDate) -> NaiveDate {
        today.checked_sub_days(Days::new(1)).unwrap_or(NaiveDate::MIN)
    }
}

/// 按本机时区返回昨天的日期
#[cfg(test)]
pub fn resolve_target_date() -> NaiveDate {
    NaiveYesterday.resolve_target_date(super::common::today(None))
}
