//! NCX（Navigation Control file for XML）文件解析模块
//!
//! 此模块提供EPUB文件中NCX导航控制文件的解析功能。
//! NCX文件主要用于定义EPUB的目录结构和导航信息。

pub mod navigation;
pub mod parser;
pub mod toc_tree;

pub use navigation::{SkippedNavPoint, TocEntry};
pub use parser::Ncx;
pub use toc_tree::{TocTree, TocTreeNode, TocTreeStyle};
