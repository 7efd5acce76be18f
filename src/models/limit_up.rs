//! 涨停数据模型
//!
//! 定义涨停池原始记录与写入明细表的快照行

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 一亿，用于流通市值换算
pub const HUNDRED_MILLION: f64 = 1e8;

/// 数据源返回的涨停池原始记录
///
/// 字段与东方财富涨停池接口一一对应，流通市值与连板数可能缺失
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LimitUpRecord {
    /// 股票代码
    pub code: String,
    /// 股票名称
    pub name: String,
    /// 涨跌幅（百分比）
    pub change_percent: f64,
    /// 最新价
    pub latest_price: f64,
    /// 成交额
    pub amount: f64,
    /// 流通市值（元）
    pub float_market_value: Option<f64>,
    /// 总市值（元）
    pub total_market_value: f64,
    /// 换手率
    pub turnover_rate: f64,
    /// 封板资金
    pub seal_fund: f64,
    /// 首次封板时间 HH:MM:SS
    pub first_seal_time: String,
    /// 最后封板时间 HH:MM:SS
    pub last_seal_time: String,
    /// 炸板次数
    pub break_count: u32,
    /// 涨停统计，格式 "天数/次数"
    pub limit_up_stat: String,
    /// 连板数
    pub consecutive_boards: Option<u32>,
    /// 所属行业
    pub industry: String,
}

/// 涨停明细快照行
///
/// 在原始记录基础上增加以亿为单位的流通市值和抓取日期，
/// 同一批次的所有行抓取日期相同
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitUpStock {
    /// 序号（从 1 开始）
    pub seq: usize,
    pub code: String,
    pub name: String,
    pub change_percent: f64,
    pub latest_price: f64,
    pub amount: f64,
    /// 流通市值（元），数据源为 null 时缺失
    pub float_market_value: Option<f64>,
    /// 流通市值（亿）
    pub float_market_value_yi: Option<f64>,
    pub total_market_value: f64,
    pub turnover_rate: f64,
    pub seal_fund: f64,
    pub first_seal_time: String,
    pub last_seal_time: String,
    pub break_count: u32,
    pub limit_up_stat: String,
    /// 连板数，缺失时在汇总阶段补为 1
    pub consecutive_boards: Option<u32>,
    pub industry: String,
    /// 抓取日期（运行当天，而非查询的交易日）
    pub capture_date: NaiveDate,
}

impl LimitUpStock {
    /// 由原始记录构建快照行
    pub fn from_record(seq: usize, record: LimitUpRecord, capture_date: NaiveDate) -> Self {
        let float_market_value = record.float_market_value;

        Self {
            seq,
            code: record.code,
            name: record.name,
            change_percent: record.change_percent,
            latest_price: record.latest_price,
            amount: record.amount,
            float_market_value,
            float_market_value_yi: float_market_value.map(|v| v / HUNDRED_MILLION),
            total_market_value: record.total_market_value,
            turnover_rate: record.turnover_rate,
            seal_fund: record.seal_fund,
            first_seal_time: record.first_seal_time,
            last_seal_time: record.last_seal_time,
            break_count: record.break_count,
            limit_up_stat: record.limit_up_stat,
            consecutive_boards: record.consecutive_boards,
            industry: record.industry,
            capture_date,
        }
    }

    /// 连板数，缺失视为首板
    pub fn boards(&self) -> u32 {
        self.consecutive_boards.unwrap_or(1)
    }
}
