//! 业务逻辑服务模块
//!
//! 封装数据获取、统计和存储逻辑

pub mod common;       // 公共常量和辅助函数
pub mod excel_store;  // 每日 Excel 存储
pub mod limit_up;     // 涨停池数据
pub mod store_path;   // 输出路径
pub mod summary;      // 每日指标统计
pub mod trade_date;   // 交易日推算
