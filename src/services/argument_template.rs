//! 参数模板服务 - 业务能力层
//!
//! 把参数模板中的占位符替换成本块板的实际值，拼成处理程序的命令行参数。

use crate::error::AppResult;
use crate::models::loaders::load_template;
use crate::models::selection::plate_var_at;
use crate::services::config_resolver::ConfigResolver;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

pub const TOKEN_PROTOCOL_PATH: &str = "[ProtocolPath]";
pub const TOKEN_PLATE_VAR: &str = "[PlateVar]";
pub const TOKEN_BARCODE: &str = "[Hbarcode]";
pub const TOKEN_BARCODE_ALT: &str = "[HBarcode]";
/// 每个 `*` 都会被替换成板号，不能转义
pub const TOKEN_PLATE_INDEX: char = '*';

/// 已加载的参数模板（不可变）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgumentTemplate {
    fragments: Vec<String>,
}

impl ArgumentTemplate {
    /// 从模板文件加载
    pub fn load(template_path: &Path) -> AppResult<Self> {
        Ok(Self {
            fragments: load_template(template_path)?,
        })
    }

    /// 直接由参数片段构造，空白片段会被丢弃
    pub fn from_fragments<I, S>(fragments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fragments: fragments
                .into_iter()
                .map(Into::into)
                .filter(|f: &String| !f.trim().is_empty())
                .collect(),
        }
    }

    pub fn fragments(&self) -> &[String] {
        &self.fragments
    }

    /// 纯文本替换，相同输入总是得到相同输出
    pub fn render(&self, protocol_path: &str, plate_var: &str, identifier: &str, plate_index: usize) -> String {
        let index = plate_index.to_string();
        self.fragments
            .iter()
            .map(|fragment| {
                fragment
                    .replace(TOKEN_PROTOCOL_PATH, protocol_path)
                    .replace(TOKEN_PLATE_VAR, plate_var)
                    .replace(TOKEN_BARCODE, identifier)
                    .replace(TOKEN_BARCODE_ALT, identifier)
                    .replace(TOKEN_PLATE_INDEX, &index)
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// 参数构建器
///
/// 职责：
/// - 持有进程内只加载一次的参数模板
/// - 按板号选出板变量，解析对应的协议文件
/// - 生成最终参数字符串
#[derive(Debug, Clone)]
pub struct ArgumentBuilder {
    template: Arc<ArgumentTemplate>,
    resolver: ConfigResolver,
}

impl ArgumentBuilder {
    pub fn new(template: ArgumentTemplate, resolver: ConfigResolver) -> Self {
        Self {
            template: Arc::new(template),
            resolver,
        }
    }

    pub fn template(&self) -> &ArgumentTemplate {
        &self.template
    }

    pub fn resolver(&self) -> &ConfigResolver {
        &self.resolver
    }

    /// 构建第 `plate_index` 块板的参数
    ///
    /// # 参数
    /// - `plate_type`: 板类型代码，第 `plate_index` 个字符作为板变量
    /// - `default_plate_var`: 代码长度不足时使用的板变量
    /// - `identifier`: 清洗后的条码
    /// - `plate_index`: 板号（从 1 开始）
    pub fn build(
        &self,
        plate_type: &str,
        default_plate_var: &str,
        identifier: &str,
        plate_index: usize,
    ) -> AppResult<String> {
        let plate_var = plate_var_at(plate_type, plate_index, default_plate_var);
        let protocol_path = self.resolver.protocol_path(&plate_var)?;
        let arguments = self.template.render(
            &protocol_path.to_string_lossy(),
            &plate_var,
            identifier,
            plate_index,
        );
        debug!("第 {} 板参数: {}", plate_index, arguments);
        Ok(arguments)
    }
}
