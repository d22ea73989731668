//! 结果写出服务 - 业务能力层
//!
//! 只负责"把输出行写成 CSV"能力，不关心流程

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::error::OutputError;
use crate::models::OutputRow;

/// CSV 写出服务
pub struct CsvWriter {
    output_path: PathBuf,
}

impl CsvWriter {
    pub fn new(output_path: impl Into<PathBuf>) -> Self {
        Self {
            output_path: output_path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.output_path
    }

    /// 写出所有输出行（含表头），必要时创建目录
    ///
    /// # 返回
    /// 写出的行数；没有任何行时不创建文件
    pub fn write(&self, rows: &[OutputRow]) -> Result<usize, OutputError> {
        let path_str = self.output_path.display().to_string();

        if rows.is_empty() {
            warn!("⚠️ 没有可保存的结果");
            return Ok(0);
        }

        if let Some(parent) = self.output_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| OutputError::CreateDir {
                    path: parent.display().to_string(),
                    source: e,
                })?;
            }
        }

        let mut writer = csv::Writer::from_path(&self.output_path).map_err(|e| OutputError::Csv {
            path: path_str.clone(),
            source: e,
        })?;

        for row in rows {
            writer.serialize(row).map_err(|e| OutputError::Csv {
                path: path_str.clone(),
                source: e,
            })?;
        }

        writer.flush().map_err(|e| OutputError::Io {
            path: path_str.clone(),
            source: e,
        })?;

        info!("💾 已保存 {} 封邮件到 {}", rows.len(), path_str);
        Ok(rows.len())
    }
}
