//! 清单模块
//!
//! 提供EPUB包中文件清单的结构定义。

use crate::epub::error::{EpubError, Result};
use serde::Serialize;
use std::collections::HashMap;

/// NCX导航文件的媒体类型
pub const NCX_MEDIA_TYPE: &str = "application/x-dtbncx+xml";

/// 清单项信息
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManifestItem {
    /// 项目ID
    pub id: String,
    /// 文件路径(相对于OPF文件)
    pub href: String,
    /// 媒体类型
    pub media_type: String,
    /// 属性(如nav、cover-image等)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<String>,
}

impl ManifestItem {
    /// 创建新的清单项
    pub fn new(id: impl Into<String>, href: impl Into<String>, media_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            href: href.into(),
            media_type: media_type.into(),
            properties: None,
        }
    }

    /// 检查是否包含指定属性
    pub fn has_property(&self, property: &str) -> bool {
        self.properties
            .as_deref()
            .is_some_and(|props| props.split_whitespace().any(|p| p == property))
    }

    /// 检查是否为NCX导航文件
    pub fn is_ncx(&self) -> bool {
        self.media_type == NCX_MEDIA_TYPE
    }
}

/// 保持插入顺序的清单，按ID索引
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Manifest {
    items: Vec<ManifestItem>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl Manifest {
    /// 创建空清单
    pub fn new() -> Self {
        Self::default()
    }

    /// 插入清单项
    ///
    /// ID为空或与已有项重复时返回 `InvalidManifestItem`，不会覆盖已有项。
    pub fn insert(&mut self, item: ManifestItem) -> Result<()> {
        if item.id.is_empty() {
            return Err(EpubError::InvalidManifestItem(format!(
                "清单项缺少id属性 (href: {:?})",
                item.href
            )));
        }
        if self.index.contains_key(&item.id) {
            return Err(EpubError::InvalidManifestItem(format!(
                "重复的清单项id: {}",
                item.id
            )));
        }

        self.index.insert(item.id.clone(), self.items.len());
        self.items.push(item);
        Ok(())
    }

    /// 根据ID获取清单项
    pub fn get(&self, id: &str) -> Option<&ManifestItem> {
        self.index.get(id).map(|&idx| &self.items[idx])
    }

    /// 按清单顺序获取指定媒体类型的所有项
    pub fn by_media_type<'a>(&'a self, media_type: &str) -> Vec<&'a ManifestItem> {
        self.items.iter().filter(|item| item.media_type == media_type).collect()
    }

    /// 按清单顺序遍历
    pub fn iter(&self) -> std::slice::Iter<'_, ManifestItem> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<'a> IntoIterator for &'a Manifest {
    type Item = &'a ManifestItem;
    type IntoIter = std::slice::Iter<'a, ManifestItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
