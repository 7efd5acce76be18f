//! 每日 Excel 存储
//!
//! 每个交易日一个 xlsx 文件，包含明细表和汇总表两个工作表，重复运行只追加不覆盖。
//!
//! 已有文件用 calamine 读出全部工作表，追加新行后用 rust_xlsxwriter 整体重写。
//! 各工作表是否已写表头记录在隐藏工作表 `_meta` 中，不再通过行数推断

use anyhow::{anyhow, Context, Result};
use calamine::{open_workbook, Data, Reader, Xlsx};
use rust_xlsxwriter::{Format, Workbook, Worksheet};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::ExportConfig;
use crate::models::{DailySummary, LimitUpStock};

/// 元数据工作表名称
pub const META_SHEET: &str = "_meta";

/// 重写日期时间单元格时使用的数字格式
const DATETIME_FORMAT: &str = "yyyy-mm-dd hh:mm:ss";

/// 明细表表头
pub const DETAIL_HEADERS: [&str; 18] = [
    "序号", "代码", "名称", "涨跌幅", "最新价", "成交额", "流通市值", "总市值", "换手率",
    "封板资金", "首次封板时间", "最后封板时间", "炸板次数", "涨停统计", "连板数", "所属行业",
    "流通市值(亿)", "日期",
];

/// 汇总表表头
pub const SUMMARY_HEADERS: [&str; 13] = [
    "日期", "涨停家数", "连板家数", "最高板高度", "首板数量", "平均流通市值(亿)",
    "中位流通市值(亿)", "主线板块1", "数量1", "主线板块2", "数量2", "主线板块3", "数量3",
];

/// 单元格
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
    Bool(bool),
    /// Excel 日期序列值
    DateTime(f64),
    Empty,
}

impl Cell {
    fn text(s: impl Into<String>) -> Self {
        Cell::Text(s.into())
    }

    fn number(value: Option<f64>) -> Self {
        value.map(Cell::Number).unwrap_or(Cell::Empty)
    }

    fn from_data(data: &Data) -> Self {
        match data {
            Data::String(s) => Cell::Text(s.clone()),
            Data::Float(f) => Cell::Number(*f),
            Data::Int(i) => Cell::Number(*i as f64),
            Data::Bool(b) => Cell::Bool(*b),
            Data::DateTime(dt) => Cell::DateTime(dt.as_f64()),
            Data::Empty => Cell::Empty,
            other => Cell::Text(other.to_string()),
        }
    }

    fn write(&self, worksheet: &mut Worksheet, row: u32, col: u16) -> Result<()> {
        match self {
            Cell::Text(s) => {
                worksheet.write_string(row, col, s.as_str())?;
            }
            Cell::Number(n) => {
                worksheet.write_number(row, col, *n)?;
            }
            Cell::Bool(b) => {
                worksheet.write_boolean(row, col, *b)?;
            }
            Cell::DateTime(serial) => {
                let format = Format::new().set_num_format(DATETIME_FORMAT);
                worksheet.write_number_with_format(row, col, *serial, &format)?;
            }
            Cell::Empty => {}
        }
        Ok(())
    }
}

/// 可写入工作表的记录
pub trait SheetRow {
    fn headers() -> &'static [&'static str];
    fn cells(&self) -> Vec<Cell>;
}

impl SheetRow for LimitUpStock {
    fn headers() -> &'static [&'static str] {
        &DETAIL_HEADERS
    }

    fn cells(&self) -> Vec<Cell> {
        vec![
            Cell::Number(self.seq as f64),
            Cell::text(&self.code),
            Cell::text(&self.name),
            Cell::Number(self.change_percent),
            Cell::Number(self.latest_price),
            Cell::Number(self.amount),
            Cell::number(self.float_market_value),
            Cell::Number(self.total_market_value),
            Cell::Number(self.turnover_rate),
            Cell::Number(self.seal_fund),
            Cell::text(&self.first_seal_time),
            Cell::text(&self.last_seal_time),
            Cell::Number(self.break_count as f64),
            Cell::text(&self.limit_up_stat),
            self.consecutive_boards
                .map(|n| Cell::Number(n as f64))
                .unwrap_or(Cell::Empty),
            Cell::text(&self.industry),
            Cell::number(self.float_market_value_yi),
            Cell::text(self.capture_date.format("%Y-%m-%d").to_string()),
        ]
    }
}

impl SheetRow for DailySummary {
    fn headers() -> &'static [&'static str] {
        &SUMMARY_HEADERS
    }

    fn cells(&self) -> Vec<Cell> {
        let mut cells = vec![
            Cell::text(self.date.format("%Y-%m-%d").to_string()),
            Cell::Number(self.total as f64),
            Cell::Number(self.lianban_count as f64),
            Cell::Number(self.max_board as f64),
            Cell::Number(self.first_board as f64),
            Cell::number(self.avg_float_mv_yi),
            Cell::number(self.median_float_mv_yi),
        ];
        for slot in &self.top_industries {
            match slot {
                Some(c) => {
                    cells.push(Cell::text(&c.industry));
                    cells.push(Cell::Number(c.count as f64));
                }
                None => {
                    cells.push(Cell::Empty);
                    cells.push(Cell::Empty);
                }
            }
        }
        cells
    }
}

/// 工作表内容
#[derive(Debug, Clone)]
pub struct Sheet {
    pub name: String,
    pub rows: Vec<Vec<Cell>>,
    /// 是否已写入表头
    pub header_written: bool,
}

impl Sheet {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            rows: Vec::new(),
            header_written: false,
        }
    }

    /// 追加记录，首次写入时先写表头
    pub fn append<R: SheetRow>(&mut self, records: &[R]) {
        if !self.header_written {
            self.rows.push(R::headers().iter().map(|h| Cell::text(*h)).collect());
            self.header_written = true;
        }
        self.rows.extend(records.iter().map(R::cells));
    }
}

/// 单日存储文件
#[derive(Debug)]
pub struct DailyStore {
    path: PathBuf,
    /// 按文件中的顺序保存，不含元数据表
    sheets: Vec<Sheet>,
}

impl DailyStore {
    /// 打开存储文件，文件不存在时返回空存储
    pub fn open(path: &Path) -> Result<Self> {
        let sheets = if path.exists() {
            log::debug!("读取已有文件: {}", path.display());
            load_sheets(path)?
        } else {
            Vec::new()
        };

        Ok(Self {
            path: path.to_path_buf(),
            sheets,
        })
    }

    #[cfg(test)]
    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }

    /// 获取工作表，不存在时在末尾新建
    pub fn sheet_mut(&mut self, name: &str) -> &mut Sheet {
        let idx = match self.sheets.iter().position(|s| s.name == name) {
            Some(idx) => idx,
            None => {
                self.sheets.push(Sheet::new(name));
                self.sheets.len() - 1
            }
        };
        &mut self.sheets[idx]
    }

    /// 保存到磁盘，先写临时文件再替换原文件
    pub fn save(&self) -> Result<()> {
        let mut workbook = Workbook::new();

        for sheet in &self.sheets {
            let worksheet = workbook.add_worksheet();
            worksheet.set_name(sheet.name.as_str())?;
            write_rows(worksheet, &sheet.rows)?;
        }

        let meta_rows: Vec<Vec<Cell>> = self
            .sheets
            .iter()
            .map(|s| {
                vec![
                    Cell::text(&s.name),
                    Cell::text(if s.header_written { "1" } else { "0" }),
                ]
            })
            .collect();
        let meta = workbook.add_worksheet();
        meta.set_name(META_SHEET)?;
        meta.set_hidden(true);
        write_rows(meta, &meta_rows)?;

        let tmp_path = self.path.with_extension("xlsx.tmp");
        workbook
            .save(&tmp_path)
            .with_context(|| format!("写入Excel文件失败: {}", tmp_path.display()))?;
        if let Err(e) = fs::rename(&tmp_path, &self.path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(anyhow!("替换Excel文件失败 {}: {}", self.path.display(), e));
        }

        log::debug!("已保存 {} 个工作表到 {}", self.sheets.len(), self.path.display());
        Ok(())
    }
}

/// 向当日存储文件追加明细和汇总
///
/// 文件不存在时新建两个工作表；已存在时在各工作表末尾追加，已写过表头的不再重复写
pub fn append_to_store(
    store_path: &Path,
    export: &ExportConfig,
    detail_rows: &[LimitUpStock],
    summary_row: &DailySummary,
) -> Result<()> {
    let mut store = DailyStore::open(store_path)?;
    store.sheet_mut(&export.detail_sheet).append(detail_rows);
    store
        .sheet_mut(&export.summary_sheet)
        .append(std::slice::from_ref(summary_row));
    store.save()
}

fn write_rows(worksheet: &mut Worksheet, rows: &[Vec<Cell>]) -> Result<()> {
    for (r, row) in rows.iter().enumerate() {
        for (c, cell) in row.iter().enumerate() {
            cell.write(worksheet, r as u32, c as u16)?;
        }
    }
    Ok(())
}

fn load_sheets(path: &Path) -> Result<Vec<Sheet>> {
    let mut workbook: Xlsx<_> =
        open_workbook(path).map_err(|e| anyhow!("打开Excel文件失败 {}: {}", path.display(), e))?;

    let sheet_names = workbook.sheet_names().to_vec();

    let header_flags: HashMap<String, bool> = if sheet_names.iter().any(|n| n == META_SHEET) {
        read_rows(&mut workbook, META_SHEET)?
            .into_iter()
            .filter_map(|row| match (row.first(), row.get(1)) {
                (Some(Cell::Text(name)), Some(flag)) => Some((name.clone(), flag_value(flag))),
                _ => None,
            })
            .collect()
    } else {
        HashMap::new()
    };

    let mut sheets = Vec::new();
    for name in sheet_names.into_iter().filter(|n| n != META_SHEET) {
        let rows = read_rows(&mut workbook, &name)?;
        // 没有元数据的旧文件：有内容即视为已写表头
        let header_written = header_flags
            .get(&name)
            .copied()
            .unwrap_or(!rows.is_empty());
        sheets.push(Sheet {
            name,
            rows,
            header_written,
        });
    }

    Ok(sheets)
}

fn read_rows(workbook: &mut Xlsx<std::io::BufReader<fs::File>>, name: &str) -> Result<Vec<Vec<Cell>>> {
    let range = workbook
        .worksheet_range(name)
        .map_err(|e| anyhow!("读取工作表 {} 失败: {}", name, e))?;

    // calamine 的区域从第一个非空单元格开始，补齐前面的空行空列以保持原位置
    let (row_offset, col_offset) = range.start().unwrap_or((0, 0));

    let mut rows: Vec<Vec<Cell>> = vec![Vec::new(); row_offset as usize];
    rows.extend(range.rows().map(|row| {
        let mut cells = vec![Cell::Empty; col_offset as usize];
        cells.extend(row.iter().map(Cell::from_data));
        while cells.last() == Some(&Cell::Empty) {
            cells.pop();
        }
        cells
    }));

    Ok(rows)
}

fn flag_value(cell: &Cell) -> bool {
    match cell {
        Cell::Text(s) => s == "1" || s.eq_ignore_ascii_case("true"),
        Cell::Number(n) => *n != 0.0,
        Cell::Bool(b) => *b,
        Cell::DateTime(_) | Cell::Empty => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::IndustryCount;
    use chrono::NaiveDate;

    fn stock(seq: usize, code: &str, boards: Option<u32>) -> LimitUpStock {
        LimitUpStock {
            seq,
            code: code.to_string(),
            name: format!("股票{}", code),
            change_percent: 10.01,
            latest_price: 12.34,
            amount: 1.5e8,
            float_market_value: Some(3.2e9),
            float_market_value_yi: Some(32.0),
            total_market_value: 4.0e9,
            turnover_rate: 5.5,
            seal_fund: 2.0e7,
            first_seal_time: "09:31:02".to_string(),
            last_seal_time: "10:12:45".to_string(),
            break_count: 0,
            limit_up_stat: "1/1".to_string(),
            consecutive_boards: boards,
            industry: "半导体".to_string(),
            capture_date: NaiveDate::from_ymd_opt(2025, 11, 25).unwrap(),
        }
    }

    fn summary(total: usize) -> DailySummary {
        DailySummary {
            date: NaiveDate::from_ymd_opt(2025, 11, 25).unwrap(),
            total,
            lianban_count: 0,
            max_board: 1,
            first_board: total,
            avg_float_mv_yi: Some(32.0),
            median_float_mv_yi: Some(32.0),
            top_industries: [
                Some(IndustryCount {
                    industry: "半导体".to_string(),
                    count: total,
                }),
                None,
                None,
            ],
        }
    }

    fn codes(sheet: &Sheet) -> Vec<String> {
        sheet
            .rows
            .iter()
            .map(|row| match &row[1] {
                Cell::Text(s) => s.clone(),
                other => format!("{:?}", other),
            })
            .collect()
    }

    #[test]
    fn test_create_new_store() {
        println!("\n========== 测试新建存储文件 ==========");
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("limitup_tracker_20251124.xlsx");
        let export = ExportConfig::default();

        let rows = vec![stock(1, "600000", Some(2)), stock(2, "000001", Some(1))];
        append_to_store(&path, &export, &rows, &summary(2)).unwrap();

        assert!(path.exists());
        assert!(!path.with_extension("xlsx.tmp").exists());

        let store = DailyStore::open(&path).unwrap();
        let detail = store.sheet("LimitUp_Detail").unwrap();
        assert!(detail.header_written);
        assert_eq!(detail.rows.len(), 3);
        assert_eq!(detail.rows[0][0], Cell::text("序号"));
        assert_eq!(detail.rows[0].len(), DETAIL_HEADERS.len());
        assert_eq!(detail.rows[1][1], Cell::text("600000"));
        assert_eq!(detail.rows[1][14], Cell::Number(2.0));
        assert_eq!(detail.rows[2][17], Cell::text("2025-11-25"));

        let summary_sheet = store.sheet("Daily_Summary").unwrap();
        assert_eq!(summary_sheet.rows.len(), 2);
        assert_eq!(summary_sheet.rows[0][0], Cell::text("日期"));
        assert_eq!(summary_sheet.rows[1][1], Cell::Number(2.0));
        assert_eq!(summary_sheet.rows[1][7], Cell::text("半导体"));
        // 空缺的主线板块不写入
        assert_eq!(summary_sheet.rows[1].len(), 9);

        assert!(store.sheet(META_SHEET).is_none());
        println!("✅ 新建存储文件测试通过！");
    }

    /// 两次追加：表头只写一次，数据按调用顺序合并
    #[test]
    fn test_append_twice() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.xlsx");
        let export = ExportConfig::default();

        append_to_store(
            &path,
            &export,
            &[stock(1, "600000", Some(1)), stock(2, "600001", Some(1))],
            &summary(2),
        )
        .unwrap();
        append_to_store(&path, &export, &[stock(1, "300750", Some(3))], &summary(1)).unwrap();

        let store = DailyStore::open(&path).unwrap();
        let detail = store.sheet(&export.detail_sheet).unwrap();
        assert_eq!(codes(detail), vec!["代码", "600000", "600001", "300750"]);

        let summary_sheet = store.sheet(&export.summary_sheet).unwrap();
        assert_eq!(summary_sheet.rows.len(), 3);
        let headers = summary_sheet
            .rows
            .iter()
            .filter(|r| r[0] == Cell::text("日期"))
            .count();
        assert_eq!(headers, 1);
        assert_eq!(summary_sheet.rows[2][1], Cell::Number(1.0));
    }

    /// 只有表头的工作表再次追加时不重复写表头
    #[test]
    fn test_header_only_section_keeps_single_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.xlsx");
        let export = ExportConfig::default();

        append_to_store(&path, &export, &[], &summary(0)).unwrap();
        append_to_store(&path, &export, &[stock(1, "600000", None)], &summary(1)).unwrap();

        let store = DailyStore::open(&path).unwrap();
        let detail = store.sheet(&export.detail_sheet).unwrap();
        assert_eq!(codes(detail), vec!["代码", "600000"]);
        // 连板数缺失时留空
        assert_eq!(detail.rows[1][14], Cell::Empty);
    }

    /// 无元数据的旧文件按“有内容即已写表头”处理，并保留其他工作表
    #[test]
    fn test_legacy_workbook_without_meta() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("legacy.xlsx");
        let export = ExportConfig::default();

        let mut workbook = Workbook::new();
        let notes = workbook.add_worksheet();
        notes.set_name("Notes").unwrap();
        notes.write_string(0, 0, "手工备注").unwrap();
        let detail = workbook.add_worksheet();
        detail.set_name("LimitUp_Detail").unwrap();
        for (c, h) in DETAIL_HEADERS.iter().enumerate() {
            detail.write_string(0, c as u16, *h).unwrap();
        }
        detail.write_number(1, 0, 1.0).unwrap();
        detail.write_string(1, 1, "688981").unwrap();
        workbook.save(&path).unwrap();

        append_to_store(&path, &export, &[stock(1, "600000", Some(1))], &summary(1)).unwrap();

        let store = DailyStore::open(&path).unwrap();
        assert_eq!(codes(store.sheet("LimitUp_Detail").unwrap()), vec!["代码", "688981", "600000"]);
        assert_eq!(store.sheet("Notes").unwrap().rows, vec![vec![Cell::text("手工备注")]]);
        // 旧文件中没有汇总表，新建并写表头
        assert_eq!(store.sheet("Daily_Summary").unwrap().rows.len(), 2);
    }

    #[test]
    fn test_custom_sheet_names() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.xlsx");
        let export = ExportConfig {
            detail_sheet: "明细".to_string(),
            summary_sheet: "汇总".to_string(),
            ..ExportConfig::default()
        };

        append_to_store(&path, &export, &[stock(1, "600000", Some(1))], &summary(1)).unwrap();

        let store = DailyStore::open(&path).unwrap();
        assert!(store.sheet("明细").is_some());
        assert!(store.sheet("汇总").is_some());
        assert!(store.sheet("LimitUp_Detail").is_none());
    }

    /// 其他工作表不从 A1 开始时，重写后保持原位置
    #[test]
    fn test_offset_sheet_keeps_position() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("offset.xlsx");
        let export = ExportConfig::default();

        let mut workbook = Workbook::new();
        let notes = workbook.add_worksheet();
        notes.set_name("Notes").unwrap();
        notes.write_string(2, 1, "B3备注").unwrap();
        workbook.save(&path).unwrap();

        append_to_store(&path, &export, &[stock(1, "600000", Some(1))], &summary(1)).unwrap();

        let mut reread: Xlsx<_> = open_workbook(&path).unwrap();
        let range = reread.worksheet_range("Notes").unwrap();
        assert_eq!(range.start(), Some((2, 1)));
        assert_eq!(range.get_value((2, 1)), Some(&Data::String("B3备注".to_string())));

        let store = DailyStore::open(&path).unwrap();
        let rows = &store.sheet("Notes").unwrap().rows;
        assert_eq!(rows.len(), 3);
        assert!(rows[0].is_empty() && rows[1].is_empty());
        assert_eq!(rows[2], vec![Cell::Empty, Cell::text("B3备注")]);
    }

    /// 布尔值和日期时间重写后类型不变
    #[test]
    fn test_bool_and_datetime_cells_survive_rewrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("typed.xlsx");
        let export = ExportConfig::default();

        let mut workbook = Workbook::new();
        let notes = workbook.add_worksheet();
        notes.set_name("Notes").unwrap();
        notes.write_boolean(0, 0, true).unwrap();
        let date_format = Format::new().set_num_format(DATETIME_FORMAT);
        notes.write_number_with_format(0, 1, 45000.5, &date_format).unwrap();
        workbook.save(&path).unwrap();

        append_to_store(&path, &export, &[stock(1, "600000", Some(1))], &summary(1)).unwrap();
        append_to_store(&path, &export, &[stock(1, "600001", Some(1))], &summary(1)).unwrap();

        let store = DailyStore::open(&path).unwrap();
        assert_eq!(
            store.sheet("Notes").unwrap().rows,
            vec![vec![Cell::Bool(true), Cell::DateTime(45000.5)]]
        );
    }

    /// 替换原文件失败时清理临时文件
    #[test]
    fn test_failed_rename_removes_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.xlsx");

        let mut store = DailyStore::open(&path).unwrap();
        store.sheet_mut("LimitUp_Detail").append(&[stock(1, "600000", Some(1))]);

        // 目标路径被非空目录占用，rename 必然失败
        fs::create_dir(&path).unwrap();
        fs::write(path.join("occupied"), b"x").unwrap();

        let result = store.save();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("替换Excel文件失败"));
        assert!(!path.with_extension("xlsx.tmp").exists());
    }

    /// 流通市值缺失时对应单元格留空
    #[test]
    fn test_missing_market_value_writes_blank() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blank.xlsx");
        let export = ExportConfig::default();

        let mut row = stock(1, "600000", Some(1));
        row.float_market_value = None;
        row.float_market_value_yi = None;
        let mut daily = summary(1);
        daily.avg_float_mv_yi = None;
        daily.median_float_mv_yi = None;

        append_to_store(&path, &export, &[row], &daily).unwrap();

        let store = DailyStore::open(&path).unwrap();
        let detail = store.sheet(&export.detail_sheet).unwrap();
        assert_eq!(detail.rows[1][6], Cell::Empty);
        assert_eq!(detail.rows[1][7], Cell::Number(4.0e9));
        assert_eq!(detail.rows[1][16], Cell::Empty);
        let summary_sheet = store.sheet(&export.summary_sheet).unwrap();
        assert_eq!(summary_sheet.rows[1][5], Cell::Empty);
        assert_eq!(summary_sheet.rows[1][6], Cell::Empty);
    }

    /// 文件损坏时返回错误
    #[test]
    fn test_corrupt_store_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.xlsx");
        fs::write(&path, b"definitely not a zip archive").unwrap();

        let result = append_to_store(&path, &ExportConfig::default(), &[stock(1, "600000", Some(1))], &summary(1));
        assert!(result.is_err());
    }
}
