//! 每日指标统计

use std::collections::HashMap;

use crate::models::{DailySummary, IndustryCount, LimitUpStock};
use crate::services::common::round2;

/// 主线板块取前几名
const TOP_INDUSTRY_COUNT: usize = 3;

/// 统计每日指标
///
/// 空批次返回 None。缺失连板数的行会被就地补为 1，因此写入明细表的数据与统计口径一致
pub fn compute_summary(rows: &mut [LimitUpStock]) -> Option<DailySummary> {
    let date = rows.first()?.capture_date;

    for row in rows.iter_mut() {
        row.consecutive_boards.get_or_insert(1);
    }

    let total = rows.len();
    let max_board = rows.iter().map(LimitUpStock::boards).max().unwrap_or(1);
    let lianban_count = rows.iter().filter(|r| r.boards() > 1).count();
    let first_board = rows.iter().filter(|r| r.boards() == 1).count();

    // 缺失流通市值的行不参与均值和中位数
    let values: Vec<f64> = rows.iter().filter_map(|r| r.float_market_value_yi).collect();

    Some(DailySummary {
        date,
        total,
        lianban_count,
        max_board,
        first_board,
        avg_float_mv_yi: mean(&values).map(round2),
        median_float_mv_yi: median(&values).map(round2),
        top_industries: top_industries(rows),
    })
}

/// 按出现次数降序取前三个行业，次数相同按首次出现顺序
fn top_industries(rows: &[LimitUpStock]) -> [Option<IndustryCount>; TOP_INDUSTRY_COUNT] {
    let mut counts: Vec<IndustryCount> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for row in rows.iter().filter(|r| !r.industry.is_empty()) {
        match index.get(row.industry.as_str()) {
            Some(&i) => counts[i].count += 1,
            None => {
                index.insert(row.industry.as_str(), counts.len());
                counts.push(IndustryCount {
                    industry: row.industry.clone(),
                    count: 1,
                });
            }
        }
    }

    // sort_by 为稳定排序
    counts.sort_by(|a, b| b.count.cmp(&a.count));

    let mut top = counts.into_iter();
    std::array::from_fn(|_| top.next())
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

fn median(values: &[f64]) -> Option<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let n = sorted.len();
    if n == 0 {
        return None;
    }
    if n % 2 == 1 {
        Some(sorted[n / 2])
    } else {
        Some((sorted[n / 2 - 1] + sorted[n / 2]) / 2.0)
    }
}
