pub mod epub;

// === 核心API重新导出 ===

/// 书籍模型（主要接口）
pub use epub::BookModel;

/// 错误处理
pub use epub::{EpubError, Result};

/// 解析配置
pub use epub::ReaderConfig;

// === 底层组件（高级用法） ===

/// 归档与容器组件
pub use epub::{Container, ExplodedArchive, PackagePointer, RootFile};

/// OPF组件
pub use epub::{Manifest, ManifestItem, Metadata, Opf, Spine, SpineItem};

/// NCX组件
pub use epub::{Ncx, SkippedNavPoint, TocEntry, TocTree, TocTreeNode, TocTreeStyle};

// === 库信息 ===

/// 库的版本信息
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// 库的描述
pub const DESCRIPTION: &str = "解析已解压EPUB目录的包结构、清单、脊柱和目录";

// === 便捷函数 ===

/// 快速解析已解压的EPUB目录
///
/// 这是 `BookModel::initialize` 的便捷包装函数。
///
/// # 示例
///
/// ```no_run
/// let book = bookdir::open("books/moby-dick")?;
/// println!("OPF目录: {}", book.package_base_dir());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn open<P: AsRef<std::path::Path>>(path: P) -> Result<BookModel> {
    BookModel::initialize(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_description() {
        assert!(!DESCRIPTION.is_empty());
    }
}
