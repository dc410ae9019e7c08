//! 目录树（Table of Contents Tree）模块
//!
//! 根据目录条目的嵌套深度重建树形结构，并提供文本显示功能。

use crate::epub::ncx::navigation::TocEntry;
use std::fmt::{Display, Formatter, Result as FmtResult};

/// 目录树显示样式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TocTreeStyle {
    /// 使用树状符号（├── └──）
    #[default]
    TreeSymbols,
    /// 使用缩进和符号（• ）
    Indented,
}

/// 目录树节点
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TocTreeNode {
    /// 播放顺序
    pub play_order: i64,
    /// 标题
    pub title: String,
    /// 源文件路径
    pub src: String,
    /// 节点ID
    pub id: String,
    /// 节点深度
    pub depth: u32,
    /// 子节点
    pub children: Vec<TocTreeNode>,
}

impl From<&TocEntry> for TocTreeNode {
    fn from(entry: &TocEntry) -> Self {
        Self {
            play_order: entry.play_order,
            title: entry.label.clone(),
            src: entry.src.clone(),
            id: entry.id.clone(),
            depth: entry.depth,
            children: Vec::new(),
        }
    }
}

impl TocTreeNode {
    /// 获取节点及其所有子节点的数量
    pub fn get_total_nodes(&self) -> usize {
        1 + self.children.iter().map(TocTreeNode::get_total_nodes).sum::<usize>()
    }
}

/// 目录树
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TocTree {
    /// 顶层节点
    pub roots: Vec<TocTreeNode>,
    /// 显示样式
    pub style: TocTreeStyle,
}

impl TocTree {
    /// 从按playOrder排序的目录条目构建目录树
    ///
    /// 条目的深度决定父子关系：每个条目挂在它之前最近的、深度更浅的条目之下。
    /// 父条目被跳过时，子条目提升为上一级。
    pub fn from_entries(entries: &[TocEntry]) -> Self {
        let mut roots = Vec::new();
        let mut stack: Vec<TocTreeNode> = Vec::new();

        for entry in entries {
            let node = TocTreeNode::from(entry);
            while stack.last().is_some_and(|top| top.depth >= node.depth) {
                if let Some(done) = stack.pop() {
                    Self::attach(&mut stack, &mut roots, done);
                }
            }
            stack.push(node);
        }

        while let Some(done) = stack.pop() {
            Self::attach(&mut stack, &mut roots, done);
        }

        Self {
            roots,
            style: TocTreeStyle::default(),
        }
    }

    fn attach(stack: &mut [TocTreeNode], roots: &mut Vec<TocTreeNode>, node: TocTreeNode) {
        match stack.last_mut() {
            Some(parent) => parent.children.push(node),
            None => roots.push(node),
        }
    }

    /// 设置显示样式
    pub fn with_style(mut self, style: TocTreeStyle) -> Self {
        self.style = style;
        self
    }

    /// 节点总数
    pub fn total_nodes(&self) -> usize {
        self.roots.iter().map(TocTreeNode::get_total_nodes).sum()
    }

    /// 最大深度
    pub fn max_depth(&self) -> u32 {
        fn depth_of(node: &TocTreeNode) -> u32 {
            node.children.iter().map(depth_of).max().map_or(1, |d| d + 1)
        }
        self.roots.iter().map(depth_of).max().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    fn fmt_tree_symbols(
        f: &mut Formatter<'_>,
        nodes: &[TocTreeNode],
        prefix: &str,
    ) -> FmtResult {
        for (i, node) in nodes.iter().enumerate() {
            let is_last = i + 1 == nodes.len();
            let connector = if is_last { "└── " } else { "├── " };
            writeln!(f, "{}{}{} ({})", prefix, connector, node.title, node.src)?;

            let child_prefix = format!("{}{}", prefix, if is_last { "    " } else { "│   " });
            Self::fmt_tree_symbols(f, &node.children, &child_prefix)?;
        }
        Ok(())
    }

    fn fmt_indented(f: &mut Formatter<'_>, nodes: &[TocTreeNode], level: usize) -> FmtResult {
        for node in nodes {
            writeln!(f, "{}• {} ({})", "  ".repeat(level), node.title, node.src)?;
            Self::fmt_indented(f, &node.children, level + 1)?;
        }
        Ok(())
    }
}

impl Display for TocTree {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self.style {
            TocTreeStyle::TreeSymbols => Self::fmt_tree_symbols(f, &self.roots, ""),
            TocTreeStyle::Indented => Self::fmt_indented(f, &self.roots, 0),
        }
    }
}
