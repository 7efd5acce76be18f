//! 涨停快照获取
//!
//! 调用数据源后换算流通市值（亿）并打上抓取日期。数据源的任何失败都不会向上传播，
//! 而是以 [`FetchOutcome::Failed`] 返回，不做重试

use anyhow::anyhow;
use chrono::NaiveDate;

use super::LimitUpSource;
use crate::models::LimitUpStock;
use crate::services::common::compact_date;

/// 预览打印的行数
const PREVIEW_ROWS: usize = 5;

/// 快照获取结果
#[derive(Debug)]
pub enum FetchOutcome {
    /// 获取到涨停数据
    Rows(Vec<LimitUpStock>),
    /// 数据源正常返回，但当日没有涨停股票
    NoLimitUp,
    /// 数据源调用失败（网络、响应格式、字段缺失）
    Failed(anyhow::Error),
}

impl FetchOutcome {
    /// 转换为快照行，无数据和失败都得到空列表
    #[cfg(test)]
    pub fn into_rows(self) -> Vec<LimitUpStock> {
        match self {
            FetchOutcome::Rows(rows) => rows,
            FetchOutcome::NoLimitUp | FetchOutcome::Failed(_) => Vec::new(),
        }
    }
}

/// 获取指定交易日的涨停快照
///
/// `capture_date` 为运行当天日期，写入每一行的“日期”列
pub async fn fetch_snapshot<S: LimitUpSource>(
    source: &S,
    trade_date: NaiveDate,
    capture_date: NaiveDate,
) -> FetchOutcome {
    let records = match source.limit_up_pool(trade_date).await {
        Ok(records) => records,
        Err(e) => {
            log::warn!("获取涨停数据失败: {:#}", e);
            println!("❌ 获取涨停数据失败: {}", e);
            return FetchOutcome::Failed(e);
        }
    };

    println!("📊 获取到涨停数据，条数: {}", records.len());

    if records.is_empty() {
        log::info!("{} 涨停池为空", compact_date(trade_date));
        return FetchOutcome::NoLimitUp;
    }

    // 整列缺失才算失败，个别行为 null 时保留该行
    if records.iter().all(|r| r.float_market_value.is_none()) {
        let e = anyhow!("涨停数据缺少流通市值字段");
        log::warn!("获取涨停数据失败: {}", e);
        println!("❌ 获取涨停数据失败: {}", e);
        return FetchOutcome::Failed(e);
    }

    let missing = records.iter().filter(|r| r.float_market_value.is_none()).count();
    if missing > 0 {
        log::warn!("{} 条涨停数据缺少流通市值，不计入市值统计", missing);
    }

    let rows: Vec<LimitUpStock> = records
        .into_iter()
        .enumerate()
        .map(|(i, record)| LimitUpStock::from_record(i + 1, record, capture_date))
        .collect();

    println!("样例数据:");
    for row in rows.iter().take(PREVIEW_ROWS) {
        println!(
            "    {} {} 连板:{} 流通市值(亿):{} 行业:{}",
            row.code,
            row.name,
            row.consecutive_boards.map(|n| n.to_string()).unwrap_or_else(|| "-".to_string()),
            row.float_market_value_yi
                .map(|v| format!("{:.2}", v))
                .unwrap_or_else(|| "-".to_string()),
            row.industry
        );
    }

    FetchOutcome::Rows(rows)
}
