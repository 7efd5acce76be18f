//! 每日涨停追踪
//!
//! 获取上一交易日的涨停池数据，统计关键指标，并追加写入按日划分的 Excel 文件
//! 数据来源：东方财富涨停池

mod config;   // 配置
mod models;   // 数据模型定义
mod pipeline; // 主流程
mod services; // 业务逻辑服务

use env_logger::Env;

use crate::config::AppConfig;
use crate::pipeline::{NoDataReason, RunReport};
use crate::services::limit_up::EastmoneyClient;
use crate::services::trade_date::NaiveYesterday;

/// 程序入口
///
/// 执行一次“获取 - 统计 - 写入”流程，存储失败时以非零状态退出
#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let (config, origin) = AppConfig::load();

    // 初始化日志系统，RUST_LOG 优先于配置文件中的级别
    env_logger::init_from_env(Env::default().default_filter_or(config.log.level.as_str()));
    origin.log();

    log::info!("启动涨停追踪，导出目录: {}", config.export.export_dir.display());

    let client = EastmoneyClient::new(&config.provider)?;

    match pipeline::run(&config, &NaiveYesterday, &client).await? {
        RunReport::Written { path, detail_rows, .. } => {
            log::info!("写入 {} 条明细到 {}", detail_rows, path.display());
        }
        RunReport::NoData(NoDataReason::NoLimitUp) => {
            log::info!("无涨停数据，跳过写入");
        }
        RunReport::NoData(NoDataReason::ProviderFailed(e)) => {
            log::warn!("数据源不可用，跳过写入: {:#}", e);
        }
    }

    Ok(())
}
