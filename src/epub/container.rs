use crate::epub::archive::{CONTAINER_PATH, ExplodedArchive};
use crate::epub::error::{EpubError, Result};
use quick_xml::events::Event;
use quick_xml::reader::Reader;
use serde::Serialize;
use std::io;

/// Container.xml中的rootfile信息
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RootFile {
    pub full_path: String,
    pub media_type: Option<String>,
}

/// Container.xml的解析结果
#[derive(Debug, Clone)]
pub struct Container {
    pub rootfiles: Vec<RootFile>,
}

/// 指向OPF包文件的指针
///
/// `base_dir` 是 `file` 去掉最后一段后的目录，OPF中出现的所有相对路径都以它为基准。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackagePointer {
    /// OPF文件相对于归档根目录的路径
    pub file: String,
    /// OPF文件所在目录（位于根目录时为空字符串）
    pub base_dir: String,
}

impl PackagePointer {
    /// 根据OPF路径创建指针
    pub fn new(file: impl Into<String>) -> Self {
        let file = file.into();
        let base_dir = match file.rfind('/') {
            Some(idx) => file[..idx].to_string(),
            None => String::new(),
        };
        Self { file, base_dir }
    }
}

impl Container {
    /// 解析container.xml内容
    ///
    /// # 参数
    /// * `xml_content` - container.xml的文件内容
    ///
    /// # 返回值
    /// * `Result<Container>` - 解析后的Container信息
    pub fn parse_xml(xml_content: &str) -> Result<Container> {
        Self::parse_rootfiles(xml_content)
            .map_err(|e| e.remap_xml(EpubError::MalformedContainer))
    }

    fn parse_rootfiles(xml_content: &str) -> Result<Container> {
        let mut reader = Reader::from_str(xml_content);
        reader.config_mut().trim_text(true);
        reader.config_mut().expand_empty_elements = true;

        let mut rootfiles = Vec::new();
        let mut buf = Vec::new();
        let mut in_rootfiles = false;

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(ref e) => match e.local_name().as_ref() {
                    b"rootfiles" => {
                        in_rootfiles = true;
                    }
                    b"rootfile" if in_rootfiles => {
                        let mut full_path = String::new();
                        let mut media_type = None;

                        for attr_result in e.attributes() {
                            let attr = attr_result.map_err(quick_xml::Error::InvalidAttr)?;
                            match attr.key.local_name().as_ref() {
                                b"full-path" => {
                                    full_path = attr.unescape_value()?.trim().to_string();
                                }
                                b"media-type" => {
                                    media_type = Some(attr.unescape_value()?.into_owned());
                                }
                                _ => {}
                            }
                        }

                        if full_path.is_empty() {
                            log::warn!("忽略缺少full-path属性的rootfile条目");
                        } else {
                            rootfiles.push(RootFile {
                                full_path,
                                media_type,
                            });
                        }
                    }
                    _ => {}
                },
                Event::End(ref e) => {
                    if e.local_name().as_ref() == b"rootfiles" {
                        in_rootfiles = false;
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        if rootfiles.is_empty() {
            return Err(EpubError::MalformedContainer(
                "没有找到任何带full-path的rootfile条目".to_string(),
            ));
        }

        Ok(Container { rootfiles })
    }

    /// 获取OPF文件路径：文档中的第一个rootfile
    pub fn get_opf_path(&self) -> Option<&str> {
        self.rootfiles.first().map(|rf| rf.full_path.as_str())
    }

    /// 获取指向OPF文件的指针
    pub fn package_pointer(&self) -> Option<PackagePointer> {
        self.get_opf_path().map(PackagePointer::new)
    }
}

/// 读取归档中的container.xml并解析出OPF指针
pub fn resolve_package(archive: &ExplodedArchive) -> Result<(Container, PackagePointer)> {
    let content = archive.read_to_string(CONTAINER_PATH).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => EpubError::MissingContainerFile(archive.path_of(CONTAINER_PATH)),
        io::ErrorKind::InvalidData => {
            EpubError::MalformedContainer(format!("文件不是有效的UTF-8: {}", e))
        }
        _ => EpubError::Io(e),
    })?;

    let container = Container::parse_xml(&content)?;
    let pointer = container.package_pointer().ok_or_else(|| {
        EpubError::MalformedContainer("container.xml中没有找到有效的rootfile".to_string())
    })?;

    log::debug!("OPF文件: {} (基准目录: {:?})", pointer.file, pointer.base_dir);
    Ok((container, pointer))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_container_xml() {
        let container_xml = r#"<?xml version="1.0"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
    <rootfiles>
        <rootfile full-path="OEBPS/content.opf" media-type="application/oebps-package+xml"/>
        <rootfile full-path="OEBPS/alt.opf"/>
    </rootfiles>
</container>"#;

        let container = Container::parse_xml(container_xml).unwrap();
        assert_eq!(container.rootfiles.len(), 2);

        let first_rootfile = &container.rootfiles[0];
        assert_eq!(first_rootfile.full_path, "OEBPS/content.opf");
        assert_eq!(
            first_rootfile.media_type.as_deref(),
            Some("application/oebps-package+xml")
        );
        assert_eq!(container.rootfiles[1].media_type, None);
        assert_eq!(container.get_opf_path(), Some("OEBPS/content.opf"));
    }

    #[test]
    fn test_package_pointer_base_dir() {
        let nested = PackagePointer::new("a/b/content.opf");
        assert_eq!(nested.base_dir, "a/b");

        let at_root = PackagePointer::new("content.opf");
        assert_eq!(at_root.file, "content.opf");
        assert_eq!(at_root.base_dir, "");
    }

    #[test]
    fn test_container_without_rootfile_is_malformed() {
        let container_xml = r#"<container><rootfiles></rootfiles></container>"#;
        let err = Container::parse_xml(container_xml).unwrap_err();
        assert!(matches!(err, EpubError::MalformedContainer(_)));
    }

    #[test]
    fn test_rootfile_without_full_path_is_malformed() {
        let container_xml =
            r#"<container><rootfiles><rootfile media-type="application/oebps-package+xml"/></rootfiles></container>"#;
        let err = Container::parse_xml(container_xml).unwrap_err();
        assert!(matches!(err, EpubError::MalformedContainer(_)));
    }

    #[test]
    fn test_broken_xml_is_malformed() {
        let container_xml = r#"<container><rootfiles><rootfile full-path="a.opf"/></container>"#;
        let err = Container::parse_xml(container_xml).unwrap_err();
        assert!(matches!(err, EpubError::MalformedContainer(_)));
    }
}
