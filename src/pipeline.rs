//! 主流程
//!
//! 推算交易日 -> 构建输出路径 -> 获取涨停快照 -> 统计指标 -> 写入 Excel

use anyhow::Result;
use chrono::NaiveDate;
use std::path::PathBuf;

use crate::config::AppConfig;
use crate::models::DailySummary;
use crate::services::common::{compact_date, today};
use crate::services::excel_store::append_to_store;
use crate::services::limit_up::{fetch_snapshot, FetchOutcome, LimitUpSource};
use crate::services::store_path::resolve_store_path;
use crate::services::summary::compute_summary;
use crate::services::trade_date::TradeDateResolver;

/// 无数据的原因
#[derive(Debug)]
pub enum NoDataReason {
    /// 当日没有涨停股票
    NoLimitUp,
    /// 数据源调用失败
    ProviderFailed(anyhow::Error),
}

/// 单次运行结果
#[derive(Debug)]
pub enum RunReport {
    /// 已写入存储文件
    Written {
        path: PathBuf,
        detail_rows: usize,
        summary: DailySummary,
    },
    /// 无数据，未写入任何文件
    NoData(NoDataReason),
}

/// 按配置的时钟执行一次完整流程
pub async fn run<R, S>(config: &AppConfig, resolver: &R, source: &S) -> Result<RunReport>
where
    R: TradeDateResolver,
    S: LimitUpSource,
{
    let today = today(config.clock.tz()?);
    run_on(config, today, resolver, source).await
}

/// 以指定日期作为“今天”执行一次完整流程
///
/// 数据源失败和无数据都正常返回 [`RunReport::NoData`]，只有存储相关错误会返回 Err
pub async fn run_on<R, S>(
    config: &AppConfig,
    today: NaiveDate,
    resolver: &R,
    source: &S,
) -> Result<RunReport>
where
    R: TradeDateResolver,
    S: LimitUpSource,
{
    let trade_date = resolver.resolve_target_date(today);
    let store_path = resolve_store_path(&config.export.export_dir, &config.export.file_base, trade_date)?;

    println!("📅 获取上一交易日数据: {}", compact_date(trade_date));

    let mut rows = match fetch_snapshot(source, trade_date, today).await {
        FetchOutcome::Rows(rows) => rows,
        FetchOutcome::NoLimitUp => {
            println!("⚠️ 今日无涨停数据。");
            return Ok(RunReport::NoData(NoDataReason::NoLimitUp));
        }
        FetchOutcome::Failed(e) => {
            println!("⚠️ 涨停数据获取失败，本次不写入。");
            return Ok(RunReport::NoData(NoDataReason::ProviderFailed(e)));
        }
    };

    println!("🧮 计算统计指标...");
    let summary = match compute_summary(&mut rows) {
        Some(summary) => summary,
        None => return Ok(RunReport::NoData(NoDataReason::NoLimitUp)),
    };
    log::info!(
        "涨停 {} 家，连板 {} 家，最高 {} 板",
        summary.total,
        summary.lianban_count,
        summary.max_board
    );

    println!("📝 写入 Excel...");
    append_to_store(&store_path, &config.export, &rows, &summary)?;

    println!("✅ 任务完成！已写入: {}", store_path.display());

    Ok(RunReport::Written {
        path: store_path,
        detail_rows: rows.len(),
        summary,
    })
}
