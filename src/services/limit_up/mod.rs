//! 涨停池数据服务
//!
//! 数据源抽象为 [`LimitUpSource`]，默认实现为东方财富涨停池

pub mod eastmoney;
pub mod fetcher;

use anyhow::Result;
use chrono::NaiveDate;

use crate::models::LimitUpRecord;

pub use eastmoney::EastmoneyClient;
pub use fetcher::{fetch_snapshot, FetchOutcome};

/// 涨停池数据源
#[allow(async_fn_in_trait)]
pub trait LimitUpSource {
    /// 获取指定交易日的涨停池
    async fn limit_up_pool(&self, trade_date: NaiveDate) -> Result<Vec<LimitUpRecord>>;
}
