// ==========================================
// 高校校舍面积缺口测算系统 - 导入层
// ==========================================
// 职责: 面积标准表导入,生成标准快照
// 支持: Excel (.xlsx/.xls), CSV
// ==========================================

// 模块声明
pub mod error;
pub mod file_parser;
pub mod standards_importer;

// 重导出核心类型
pub use error::{ImportError, ImportResult};
pub use file_parser::{CsvParser, ExcelParser, FileParser, RawRow, UniversalFileParser};
pub use standards_importer::StandardsImporter;
