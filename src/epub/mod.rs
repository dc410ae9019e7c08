pub mod error;
pub mod archive;
pub mod container;
pub mod opf;
pub mod ncx;
pub mod book;

// 重新导出错误处理
pub use error::{EpubError, Result};

// 重新导出归档与容器相关
pub use archive::ExplodedArchive;
pub use container::{Container, PackagePointer, RootFile};

// 重新导出书籍模型
pub use book::BookModel;

// 重新导出OPF相关
pub use opf::{
    Opf,
    Metadata,
    Manifest,
    ManifestItem,
    Spine,
    SpineItem,
    ReaderConfig,
};

// 重新导出NCX相关
pub use ncx::{
    Ncx,
    TocEntry,
    SkippedNavPoint,
    TocTree,
    TocTreeNode,
    TocTreeStyle,
};
