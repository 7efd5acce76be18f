//! 东方财富涨停池接口实现
//!
//! 对接 https://push2ex.eastmoney.com/getTopicZTPool，对应 akshare 的 stock_zt_pool_em

use anyhow::{anyhow, Result};
use chrono::{NaiveDate, Utc};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, REFERER, USER_AGENT};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

use super::LimitUpSource;
use crate::config::ProviderConfig;
use crate::models::LimitUpRecord;
use crate::services::common::{compact_date, format_seal_time, BROWSER_USER_AGENT, EM_ZT_POOL_UT};

/// 东方财富涨停池客户端
pub struct EastmoneyClient {
    /// HTTP 客户端
    client: Client,
    /// 涨停池接口地址
    pool_url: String,
}

impl EastmoneyClient {
    /// 按配置创建客户端，带浏览器请求头和超时设置
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json, text/plain, */*"));
        headers.insert(REFERER, HeaderValue::from_static("https://quote.eastmoney.com/ztb/"));

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            pool_url: config.pool_url.clone(),
        })
    }
}

impl LimitUpSource for EastmoneyClient {
    async fn limit_up_pool(&self, trade_date: NaiveDate) -> Result<Vec<LimitUpRecord>> {
        let date = compact_date(trade_date);
        let timestamp = Utc::now().timestamp_millis().to_string();

        log::debug!("请求东方财富涨停池 URL: {} date={}", self.pool_url, date);

        let response = self
            .client
            .get(&self.pool_url)
            .query(&[
                ("ut", EM_ZT_POOL_UT),
                ("dpt", "wz.ztzt"),
                ("Pageindex", "0"),
                ("pagesize", "10000"),
                ("sort", "fbt:asc"),
                ("date", date.as_str()),
                ("_", timestamp.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(anyhow!("获取涨停池数据失败: {}", response.status()));
        }

        let text = response.text().await?;
        parse_zt_pool(&text)
    }
}

/// 解析涨停池响应
///
/// `data` 为 null 表示当日没有涨停数据，返回空列表
pub fn parse_zt_pool(text: &str) -> Result<Vec<LimitUpRecord>> {
    let json: Value = serde_json::from_str(text).map_err(|e| anyhow!("解析涨停池JSON失败: {}", e))?;

    let data = match json.get("data") {
        Some(Value::Null) | None => return Ok(Vec::new()),
        Some(data) => data,
    };

    let pool = data["pool"]
        .as_array()
        .ok_or_else(|| anyhow!("涨停池响应缺少 pool 字段"))?;

    Ok(pool.iter().map(parse_pool_item).collect())
}

fn parse_pool_item(item: &Value) -> LimitUpRecord {
    let limit_up_stat = match (item["zttj"]["days"].as_i64(), item["zttj"]["ct"].as_i64()) {
        (Some(days), Some(ct)) => format!("{}/{}", days, ct),
        _ => String::new(),
    };

    LimitUpRecord {
        code: item["c"].as_str().unwrap_or("").to_string(),
        name: item["n"].as_str().unwrap_or("").to_string(),
        change_percent: number(&item["zdp"]).unwrap_or(0.0),
        // 接口价格单位为千分之一元
        latest_price: number(&item["p"]).unwrap_or(0.0) / 1000.0,
        amount: number(&item["amount"]).unwrap_or(0.0),
        float_market_value: number(&item["ltsz"]),
        total_market_value: number(&item["tshare"]).unwrap_or(0.0),
        turnover_rate: number(&item["hs"]).unwrap_or(0.0),
        seal_fund: number(&item["fund"]).unwrap_or(0.0),
        first_seal_time: item["fbt"].as_i64().map(format_seal_time).unwrap_or_default(),
        last_seal_time: item["lbt"].as_i64().map(format_seal_time).unwrap_or_default(),
        break_count: item["zbc"].as_u64().unwrap_or(0) as u32,
        limit_up_stat,
        consecutive_boards: item["lbc"].as_u64().map(|n| n as u32),
        industry: item["hybk"].as_str().unwrap_or("").to_string(),
    }
}

/// 数值字段可能是数字或字符串
fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}
