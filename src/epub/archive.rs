//! 已解压EPUB目录的文件访问
//!
//! 所有读取都相对于归档根目录进行，包内路径统一使用 `/` 分隔。

use percent_encoding::percent_decode_str;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// container.xml 的固定位置
pub const CONTAINER_PATH: &str = "META-INF/container.xml";

/// 一个已解压到文件系统上的EPUB归档
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExplodedArchive {
    root: PathBuf,
}

impl ExplodedArchive {
    /// 以指定目录作为归档根目录
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// 归档根目录
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// 将包内路径（`/` 分隔）转换为文件系统路径
    pub fn path_of(&self, inner_path: &str) -> PathBuf {
        let mut path = self.root.clone();
        for segment in inner_path.split('/').filter(|s| !s.is_empty() && *s != ".") {
            if segment == ".." {
                // 不允许越过归档根目录
                if path != self.root {
                    path.pop();
                }
            } else {
                path.push(segment);
            }
        }
        path
    }

    /// 读取包内文件为字符串，去除可能存在的UTF-8 BOM
    pub fn read_to_string(&self, inner_path: &str) -> io::Result<String> {
        let content = fs::read_to_string(self.path_of(inner_path))?;
        Ok(match content.strip_prefix('\u{feff}') {
            Some(stripped) => stripped.to_string(),
            None => content,
        })
    }
}

/// 将相对于基准目录的href解析为包内路径
///
/// 去掉片段标识符（`#...`）并进行百分号解码。`base_dir` 为空表示归档根目录。
pub fn join_href(base_dir: &str, href: &str) -> String {
    let without_fragment = href.split('#').next().unwrap_or_default();
    let decoded = percent_decode_str(without_fragment).decode_utf8_lossy();

    if base_dir.is_empty() {
        decoded.into_owned()
    } else {
        format!("{}/{}", base_dir.trim_end_matches('/'), decoded)
    }
}
