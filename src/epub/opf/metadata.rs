//! 元数据处理模块
//!
//! 保存OPF中Dublin Core元数据的文本值。同名字段可能出现多次（如多个作者），
//! 所有值都按文档顺序保留。

use serde::Serialize;

/// Dublin Core元数据表
///
/// 键为去掉命名空间前缀的本地元素名（如 `title`、`creator`），按首次出现的顺序保存。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Metadata {
    fields: Vec<(String, Vec<String>)>,
}

impl Metadata {
    /// 创建空的元数据表
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加一个Dublin Core元数据值
    pub fn add_dublin_core(&mut self, field: impl Into<String>, value: impl Into<String>) {
        let field = field.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(name, _)| *name == field) {
            Some((_, values)) => values.push(value),
            None => self.fields.push((field, vec![value])),
        }
    }

    /// 获取字段的第一个值
    pub fn get(&self, field: &str) -> Option<&str> {
        self.get_all(field).first().map(String::as_str)
    }

    /// 获取字段的所有值，字段不存在时返回空切片
    pub fn get_all(&self, field: &str) -> &[String] {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, values)| values.as_slice())
            .unwrap_or(&[])
    }

    /// 是否包含指定字段
    pub fn contains(&self, field: &str) -> bool {
        self.fields.iter().any(|(name, _)| name == field)
    }

    /// 按首次出现顺序遍历所有字段
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.fields
            .iter()
            .map(|(name, values)| (name.as_str(), values.as_slice()))
    }

    /// 字段数量
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// 获取标题
    pub fn title(&self) -> Option<&str> {
        self.get("title")
    }

    /// 获取所有创建者
    pub fn creators(&self) -> &[String] {
        self.get_all("creator")
    }

    /// 获取语言
    pub fn language(&self) -> Option<&str> {
        self.get("language")
    }

    /// 获取第一个标识符
    pub fn identifier(&self) -> Option<&str> {
        self.get("identifier")
    }
}
