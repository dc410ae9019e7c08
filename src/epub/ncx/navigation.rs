//! NCX导航元素数据结构定义

use serde::Serialize;

/// 目录条目（对应一个navPoint）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TocEntry {
    /// navPoint的id属性
    pub id: String,
    /// 播放顺序，按数值排序
    pub play_order: i64,
    /// navLabel中的文本
    pub label: String,
    /// content的src属性(相对于OPF目录，可能带有片段)
    pub src: String,
    /// 嵌套深度，顶层为1
    pub depth: u32,
}

impl TocEntry {
    /// 去掉片段标识符后的文件路径
    pub fn file(&self) -> &str {
        self.src.split('#').next().unwrap_or_default()
    }

    /// 片段标识符（不含 `#`）
    pub fn fragment(&self) -> Option<&str> {
        self.src.split_once('#').map(|(_, fragment)| fragment)
    }
}

/// 被跳过的navPoint及原因
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedNavPoint {
    /// navPoint的id（如果有）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// 跳过原因
    pub reason: String,
}

/// 解析过程中尚未闭合的navPoint
#[derive(Debug, Default)]
pub(crate) struct PendingNavPoint {
    /// 文档顺序中的序号，用于相同playOrder时的稳定排序
    pub seq: usize,
    pub depth: u32,
    pub id: Option<String>,
    pub play_order: Option<String>,
    pub label: Option<String>,
    pub src: Option<String>,
}
