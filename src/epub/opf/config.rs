//! 解析配置模块
//!
//! 控制NCX导航文件的查找方式以及Dublin Core命名空间，支持从YAML文件加载配置。

use crate::epub::error::{EpubError, Result};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Dublin Core 1.1 元素命名空间
pub const DC_NAMESPACE: &str = "http://purl.org/dc/elements/1.1/";

/// 约定的NCX清单项ID
pub const DEFAULT_NAVIGATION_ID: &str = "ncx";

static DEFAULT_CONFIG: Lazy<ReaderConfig> = Lazy::new(|| ReaderConfig {
    navigation_id: DEFAULT_NAVIGATION_ID.to_string(),
    navigation_fallback: true,
    dublin_core_namespace: DC_NAMESPACE.to_string(),
});

/// 解析EPUB目录时使用的配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderConfig {
    /// NCX导航文件在清单中的ID
    pub navigation_id: String,
    /// 清单中没有 `navigation_id` 时，是否依次尝试脊柱的toc属性和NCX媒体类型
    pub navigation_fallback: bool,
    /// 元数据中视为Dublin Core的命名空间
    pub dublin_core_namespace: String,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        DEFAULT_CONFIG.clone()
    }
}

impl ReaderConfig {
    /// 从YAML配置文件加载，未出现的字段使用默认值
    ///
    /// # 示例
    ///
    /// ```no_run
    /// use bookdir::ReaderConfig;
    /// let config = ReaderConfig::from_file("bookdir.yaml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .map_err(|e| EpubError::ConfigError(format!("无法读取配置文件: {}", e)))?;

        Self::from_yaml(&content)
    }

    /// 从YAML字符串解析配置
    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yml::from_str(content)
            .map_err(|e| EpubError::ConfigError(format!("配置文件格式错误: {}", e)))
    }

    /// 将默认配置写入指定路径
    pub fn generate_default_config<P: AsRef<Path>>(path: P) -> Result<()> {
        let yaml_content = serde_yml::to_string(&*DEFAULT_CONFIG)
            .map_err(|e| EpubError::ConfigError(format!("序列化配置失败: {}", e)))?;

        let content_with_header = format!(
            "# bookdir 解析配置文件\n# navigation_id: NCX导航文件的清单ID\n# navigation_fallback: 找不到该ID时是否尝试其他方式定位NCX\n\n{}",
            yaml_content
        );

        fs::write(path.as_ref(), content_with_header)
            .map_err(|e| EpubError::ConfigError(format!("写入配置文件失败: {}", e)))
    }
}
