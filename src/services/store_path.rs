//! 输出文件路径构建

use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::fs;
use std::path::{Path, PathBuf};

use super::common::compact_date;

/// 输出文件扩展名
pub const STORE_EXTENSION: &str = "xlsx";

/// 构建当日输出文件路径，导出目录不存在时自动创建
///
/// 返回 `{export_root}/{file_base}_{YYYYMMDD}.xlsx`
pub fn resolve_store_path(export_root: &Path, file_base: &str, target_date: NaiveDate) -> Result<PathBuf> {
    fs::create_dir_all(export_root)
        .with_context(|| format!("创建导出目录 {} 失败", export_root.display()))?;

    let file_name = format!("{}_{}.{}", file_base, compact_date(target_date), STORE_EXTENSION);
    Ok(export_root.join(file_name))
}
