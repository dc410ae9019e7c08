//! 书籍模型
//!
//! 一次性完成 container.xml → OPF → NCX 的解析，得到只读的书籍模型。
//! 初始化要么完整成功，要么返回遇到的第一个错误。

use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::epub::archive::{ExplodedArchive, join_href};
use crate::epub::container::{PackagePointer, RootFile, resolve_package};
use crate::epub::error::{EpubError, Result};
use crate::epub::ncx::{Ncx, SkippedNavPoint, TocEntry, TocTree};
use crate::epub::opf::{Manifest, ManifestItem, Metadata, Opf, ReaderConfig, Spine, SpineItem};

/// 已解析的书籍模型
///
/// 通过 [`BookModel::initialize`] 构造，之后只提供只读访问。
#[derive(Debug, Clone, Serialize)]
pub struct BookModel {
    root: PathBuf,
    rootfiles: Vec<RootFile>,
    package: PackagePointer,
    #[serde(skip_serializing_if = "Option::is_none")]
    version: Option<String>,
    metadata: Metadata,
    manifest: Manifest,
    spine: Spine,
    navigation_path: String,
    navigation: Ncx,
}

impl BookModel {
    /// 使用默认配置解析已解压的EPUB目录
    ///
    /// # 参数
    /// * `root` - 归档根目录（包含 `META-INF/container.xml`）
    ///
    /// # 返回值
    /// * `Result<BookModel>` - 解析完成的书籍模型
    ///
    /// # 示例
    ///
    /// ```no_run
    /// use bookdir::BookModel;
    ///
    /// let book = BookModel::initialize("books/moby-dick")?;
    /// println!("书名: {:?}", book.metadata("title"));
    /// for entry in book.toc() {
    ///     println!("{} -> {}", entry.label, entry.src);
    /// }
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn initialize<P: AsRef<Path>>(root: P) -> Result<BookModel> {
        Self::initialize_with_config(root, &ReaderConfig::default())
    }

    /// 使用指定配置解析已解压的EPUB目录
    pub fn initialize_with_config<P: AsRef<Path>>(root: P, config: &ReaderConfig) -> Result<BookModel> {
        let archive = ExplodedArchive::new(root);
        log::debug!("开始解析EPUB目录: {}", archive.root().display());

        let (container, package) = resolve_package(&archive)?;
        let opf = Self::load_package(&archive, &package, config)?;
        let (navigation_path, navigation) = Self::load_navigation(&archive, &package, &opf, config)?;

        let Opf {
            version,
            metadata,
            manifest,
            spine,
        } = opf;

        Ok(BookModel {
            root: archive.root().to_path_buf(),
            rootfiles: container.rootfiles,
            package,
            version,
            metadata,
            manifest,
            spine,
            navigation_path,
            navigation,
        })
    }

    /// 读取并解析OPF包文件
    fn load_package(archive: &ExplodedArchive, package: &PackagePointer, config: &ReaderConfig) -> Result<Opf> {
        let content = archive.read_to_string(&package.file).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => EpubError::MissingPackageDocument(archive.path_of(&package.file)),
            io::ErrorKind::InvalidData => {
                EpubError::MalformedPackageDocument(format!("{}: 文件不是有效的UTF-8", package.file))
            }
            _ => EpubError::Io(e),
        })?;

        Opf::parse_xml_with_config(&content, config)
    }

    /// 通过清单定位并解析NCX导航文件，返回NCX的包内路径和解析结果
    fn load_navigation(
        archive: &ExplodedArchive,
        package: &PackagePointer,
        opf: &Opf,
        config: &ReaderConfig,
    ) -> Result<(String, Ncx)> {
        let item = opf.navigation_item(config).ok_or_else(|| {
            EpubError::MissingNavigationDocument(format!(
                "清单中没有id为 {} 的项",
                config.navigation_id
            ))
        })?;

        let navigation_path = join_href(&package.base_dir, &item.href);
        let content = archive.read_to_string(&navigation_path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => {
                EpubError::MissingNavigationDocument(format!("文件不存在: {}", navigation_path))
            }
            io::ErrorKind::InvalidData => EpubError::MalformedNavigationDocument(format!(
                "{}: 文件不是有效的UTF-8",
                navigation_path
            )),
            _ => EpubError::Io(e),
        })?;

        log::debug!("NCX文件: {}", navigation_path);
        let ncx = Ncx::parse_xml(&content)?;
        Ok((navigation_path, ncx))
    }

    /// 获取元数据字段的第一个值
    pub fn metadata(&self, field: &str) -> Option<&str> {
        self.metadata.get(field)
    }

    /// 获取元数据字段的所有值
    pub fn metadata_all(&self, field: &str) -> &[String] {
        self.metadata.get_all(field)
    }

    /// 完整的元数据表
    pub fn metadata_table(&self) -> &Metadata {
        &self.metadata
    }

    /// 根据ID获取清单项
    pub fn manifest_entry(&self, id: &str) -> Option<&ManifestItem> {
        self.manifest.get(id)
    }

    /// 按清单顺序获取指定媒体类型的所有清单项，没有匹配项时返回 `None`
    pub fn manifest_by_type(&self, media_type: &str) -> Option<Vec<&ManifestItem>> {
        let items = self.manifest.by_media_type(media_type);
        (!items.is_empty()).then_some(items)
    }

    /// 完整的清单
    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    /// 脊柱项（阅读顺序）
    pub fn spine(&self) -> &[SpineItem] {
        &self.spine.items
    }

    /// 按阅读顺序解析出的清单项，清单中不存在的ID被跳过
    pub fn spine_entries(&self) -> Vec<&ManifestItem> {
        self.spine
            .idrefs()
            .filter_map(|idref| self.manifest.get(idref))
            .collect()
    }

    /// 按playOrder排序的目录
    pub fn toc(&self) -> &[TocEntry] {
        &self.navigation.entries
    }

    /// 目录树
    pub fn toc_tree(&self) -> TocTree {
        TocTree::from_entries(&self.navigation.entries)
    }

    /// NCX中的docTitle
    pub fn toc_title(&self) -> Option<&str> {
        self.navigation.title.as_deref()
    }

    /// 解析目录时被跳过的navPoint
    pub fn skipped_nav_points(&self) -> &[SkippedNavPoint] {
        &self.navigation.skipped
    }

    /// OPF文件所在目录（相对于归档根目录，可能为空）
    pub fn package_base_dir(&self) -> &str {
        &self.package.base_dir
    }

    /// OPF文件路径（相对于归档根目录）
    pub fn package_path(&self) -> &str {
        &self.package.file
    }

    /// container.xml中声明的所有rootfile
    pub fn rootfiles(&self) -> &[RootFile] {
        &self.rootfiles
    }

    /// OPF的version属性
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// NCX文件路径（相对于归档根目录）
    pub fn navigation_path(&self) -> &str {
        &self.navigation_path
    }

    /// 归档根目录
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// 将OPF中的相对href解析为文件系统路径
    pub fn resolve_href(&self, href: &str) -> PathBuf {
        ExplodedArchive::new(&self.root).path_of(&join_href(&self.package.base_dir, href))
    }

    /// 以YAML格式导出整个模型，用于诊断
    pub fn to_yaml(&self) -> Result<String> {
        serde_yml::to_string(self).map_err(|e| EpubError::SerializeError(e.to_string()))
    }
}
