//! 脊柱模块
//!
//! 提供EPUB包中阅读顺序（脊柱）的结构定义。脊柱顺序就是文档顺序，不做任何重排。

use serde::Serialize;

/// 脊柱项信息(阅读顺序)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpineItem {
    /// 引用的清单项ID
    pub idref: String,
    /// 是否线性阅读
    pub linear: bool,
}

impl SpineItem {
    /// 创建指定线性属性的脊柱项
    pub fn with_linear(idref: impl Into<String>, linear: bool) -> Self {
        Self {
            idref: idref.into(),
            linear,
        }
    }
}

/// 脊柱：阅读顺序及其 `toc` 属性
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Spine {
    /// `<spine toc="...">` 指向的NCX清单项ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub toc: Option<String>,
    /// 按文档顺序排列的脊柱项
    pub items: Vec<SpineItem>,
}

impl Spine {
    /// 按阅读顺序返回所有清单项ID
    pub fn idrefs(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(|item| item.idref.as_str())
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
