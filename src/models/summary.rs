//! 每日汇总模型

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 主线板块统计（行业名称 + 出现次数）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndustryCount {
    pub industry: String,
    pub count: usize,
}

/// 每日汇总记录
///
/// 每次运行生成一条，写入汇总表
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailySummary {
    /// 日期（取自批次的抓取日期）
    pub date: NaiveDate,
    /// 涨停家数
    pub total: usize,
    /// 连板家数（连板数 > 1）
    pub lianban_count: usize,
    /// 最高板高度
    pub max_board: u32,
    /// 首板数量（连板数 == 1）
    pub first_board: usize,
    /// 平均流通市值（亿），保留两位小数；所有行都缺失流通市值时为 None
    pub avg_float_mv_yi: Option<f64>,
    /// 中位流通市值（亿），保留两位小数
    pub median_float_mv_yi: Option<f64>,
    /// 前三主线板块，不足三个时对应位置为 None
    pub top_industries: [Option<IndustryCount>; 3],
}
