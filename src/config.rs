//! 配置模块
//!
//! 支持从 JSON 文件加载系统配置，所有字段均有默认值

use anyhow::anyhow;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// 导出配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// 导出根目录
    #[serde(default = "default_export_dir")]
    pub export_dir: PathBuf,
    /// 文件名基础，最终文件名为 `{file_base}_{YYYYMMDD}.xlsx`
    #[serde(default = "default_file_base")]
    pub file_base: String,
    /// 涨停明细工作表名称
    #[serde(default = "default_detail_sheet")]
    pub detail_sheet: String,
    /// 每日汇总工作表名称
    #[serde(default = "default_summary_sheet")]
    pub summary_sheet: String,
}

/// 行情数据源配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// 东方财富涨停池接口地址
    #[serde(default = "default_pool_url")]
    pub pool_url: String,
    /// 请求超时时间（秒）
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// 连接超时时间（秒）
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

/// 时钟配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClockConfig {
    /// IANA 时区名称，如 "Asia/Shanghai"；为空则使用本机时区
    #[serde(default)]
    pub timezone: Option<String>,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// 日志级别: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,
}

/// 应用配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// 导出配置
    #[serde(default)]
    pub export: ExportConfig,
    /// 数据源配置
    #[serde(default)]
    pub provider: ProviderConfig,
    /// 时钟配置
    #[serde(default)]
    pub clock: ClockConfig,
    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

// 默认值函数
fn default_export_dir() -> PathBuf { PathBuf::from("limitup_tracker") }
fn default_file_base() -> String { "limitup_tracker".to_string() }
fn default_detail_sheet() -> String { "LimitUp_Detail".to_string() }
fn default_summary_sheet() -> String { "Daily_Summary".to_string() }
fn default_pool_url() -> String { "https://push2ex.eastmoney.com/getTopicZTPool".to_string() }
fn default_timeout() -> u64 { 30 }
fn default_connect_timeout() -> u64 { 10 }
fn default_log_level() -> String { "info".to_string() }

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            export_dir: default_export_dir(),
            file_base: default_file_base(),
            detail_sheet: default_detail_sheet(),
            summary_sheet: default_summary_sheet(),
        }
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            pool_url: default_pool_url(),
            timeout_secs: default_timeout(),
            connect_timeout_secs: default_connect_timeout(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl ClockConfig {
    /// 解析配置的时区，未配置时返回 None（使用本机时区）
    pub fn tz(&self) -> anyhow::Result<Option<Tz>> {
        match self.timezone.as_deref() {
            None | Some("") => Ok(None),
            Some(name) => name
                .parse::<Tz>()
                .map(Some)
                .map_err(|e| anyhow!("无效的时区配置 {}: {}", name, e)),
        }
    }
}

impl AppConfig {
    /// 从 JSON 文件加载配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: AppConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// 加载配置，优先从文件，失败则使用默认值
    ///
    /// 加载时日志尚未初始化（日志级别来自配置本身），加载来源随配置一起返回，由调用方记录
    pub fn load() -> (Self, ConfigOrigin) {
        let config_paths = ["config.json", "config/config.json"];
        let mut failure = None;

        for path in config_paths {
            if Path::new(path).exists() {
                match Self::from_file(path) {
                    Ok(config) => return (config, ConfigOrigin::File(PathBuf::from(path))),
                    Err(e) => {
                        failure = Some(ConfigOrigin::Fallback {
                            path: PathBuf::from(path),
                            error: e.to_string(),
                        });
                    }
                }
            }
        }

        (Self::default(), failure.unwrap_or(ConfigOrigin::Default))
    }
}

/// 配置来源
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigOrigin {
    /// 从文件加载
    File(PathBuf),
    /// 未找到配置文件，使用默认值
    Default,
    /// 配置文件解析失败，使用默认值
    Fallback { path: PathBuf, error: String },
}

impl ConfigOrigin {
    /// 记录加载来源
    pub fn log(&self) {
        match self {
            ConfigOrigin::File(path) => log::info!("从 {} 加载配置成功", path.display()),
            ConfigOrigin::Default => log::info!("使用默认配置"),
            ConfigOrigin::Fallback { path, error } => {
                log::warn!("加载配置文件 {} 失败: {}，使用默认配置", path.display(), error)
            }
        }
    }
}
