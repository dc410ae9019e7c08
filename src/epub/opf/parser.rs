//! OPF解析器模块
//!
//! 提供OPF（Open Packaging Format）文件的XML解析功能。元数据、清单、脊柱在同一次遍历中提取。

use crate::epub::error::{EpubError, Result};
use crate::epub::opf::{
    config::ReaderConfig,
    manifest::{Manifest, ManifestItem},
    metadata::Metadata,
    spine::{Spine, SpineItem},
};
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::reader::NsReader;
use serde::Serialize;

/// 当前所在的OPF顶层区块
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    None,
    Metadata,
    Manifest,
    Spine,
}

/// OPF文件解析结果
#[derive(Debug, Clone, Serialize)]
pub struct Opf {
    /// EPUB版本
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Dublin Core元数据
    pub metadata: Metadata,
    /// 清单项(文件列表)
    pub manifest: Manifest,
    /// 脊柱(阅读顺序)
    pub spine: Spine,
}

impl Opf {
    /// 使用默认配置解析OPF文件内容
    ///
    /// # 参数
    /// * `xml_content` - OPF文件的XML内容
    ///
    /// # 返回值
    /// * `Result<Opf>` - 解析后的OPF信息
    pub fn parse_xml(xml_content: &str) -> Result<Opf> {
        Self::parse_xml_with_config(xml_content, &ReaderConfig::default())
    }

    /// 使用指定配置解析OPF文件内容
    ///
    /// XML格式错误统一报告为 `MalformedPackageDocument`。
    pub fn parse_xml_with_config(xml_content: &str, config: &ReaderConfig) -> Result<Opf> {
        Self::parse_document(xml_content, config)
            .map_err(|e| e.remap_xml(EpubError::MalformedPackageDocument))
    }

    fn parse_document(xml_content: &str, config: &ReaderConfig) -> Result<Opf> {
        let mut reader = NsReader::from_str(xml_content);
        reader.config_mut().trim_text(true);
        reader.config_mut().expand_empty_elements = true;

        let dc_namespace = config.dublin_core_namespace.as_bytes();
        let mut version = None;
        let mut metadata = Metadata::new();
        let mut manifest = Manifest::new();
        let mut spine = Spine::default();

        let mut buf = Vec::new();
        let mut depth = 0usize;
        let mut found_package = false;
        let mut section = Section::None;
        // 正在收集文本的DC元素: (本地名, 元素深度)
        let mut current_field: Option<(String, usize)> = None;
        let mut text_content = String::new();

        loop {
            match reader.read_resolved_event_into(&mut buf)? {
                (ns, Event::Start(e)) => {
                    depth += 1;
                    let local_name = e.local_name();

                    if depth == 1 {
                        if local_name.as_ref() != b"package" {
                            return Err(EpubError::MalformedPackageDocument(format!(
                                "根元素应为package，实际为 {}",
                                String::from_utf8_lossy(local_name.as_ref())
                            )));
                        }
                        found_package = true;
                        version = Self::parse_package_version(&e)?;
                    } else {
                        match (section, local_name.as_ref()) {
                            (Section::None, b"metadata") => section = Section::Metadata,
                            (Section::None, b"manifest") => section = Section::Manifest,
                            (Section::None, b"spine") => {
                                section = Section::Spine;
                                spine.toc = Self::parse_spine_toc(&e)?;
                            }
                            (Section::Manifest, b"item") => {
                                Self::parse_manifest_item(&e, &mut manifest)?;
                            }
                            (Section::Spine, b"itemref") => {
                                Self::parse_spine_item(&e, &mut spine)?;
                            }
                            (Section::Metadata, name)
                                if current_field.is_none()
                                    && Self::is_dublin_core(&ns, &e, dc_namespace) =>
                            {
                                current_field =
                                    Some((String::from_utf8_lossy(name).into_owned(), depth));
                                text_content.clear();
                            }
                            _ => {}
                        }
                    }
                }
                (_, Event::End(e)) => {
                    if current_field.as_ref().is_some_and(|(_, d)| *d == depth) {
                        if let Some((field, _)) = current_field.take() {
                            Self::process_metadata_text(field, &text_content, &mut metadata);
                        }
                    }

                    match (section, e.local_name().as_ref()) {
                        (Section::Metadata, b"metadata")
                        | (Section::Manifest, b"manifest")
                        | (Section::Spine, b"spine") => section = Section::None,
                        _ => {}
                    }
                    depth = depth.saturating_sub(1);
                }
                (_, Event::Text(e)) if depth == 0 => {
                    return Err(EpubError::MalformedPackageDocument(format!(
                        "根元素之外存在文本: {:?}",
                        String::from_utf8_lossy(&e)
                    )));
                }
                (_, Event::Text(e)) if current_field.is_some() => {
                    Self::push_text(&mut text_content, &e.unescape()?);
                }
                (_, Event::CData(e)) if current_field.is_some() => {
                    Self::push_text(&mut text_content, &String::from_utf8_lossy(&e));
                }
                (_, Event::Eof) => {
                    if depth != 0 {
                        return Err(EpubError::MalformedPackageDocument(format!(
                            "文件在 {} 个元素未闭合时结束",
                            depth
                        )));
                    }
                    break;
                }
                _ => {}
            }
            buf.clear();
        }

        if !found_package {
            return Err(EpubError::MalformedPackageDocument(
                "没有找到package根元素".to_string(),
            ));
        }

        log::debug!(
            "OPF解析完成: {} 个元数据字段, {} 个清单项, {} 个脊柱项",
            metadata.len(),
            manifest.len(),
            spine.len()
        );

        Ok(Opf {
            version,
            metadata,
            manifest,
            spine,
        })
    }

    /// 判断元素是否属于Dublin Core
    ///
    /// 命名空间匹配，或者（对于未声明命名空间的文档）使用 `dc` 前缀。
    fn is_dublin_core(ns: &ResolveResult, e: &BytesStart, dc_namespace: &[u8]) -> bool {
        if let ResolveResult::Bound(Namespace(uri)) = ns {
            if *uri == dc_namespace {
                return true;
            }
        }
        e.name().prefix().is_some_and(|prefix| prefix.as_ref() == b"dc")
    }

    /// 拼接元素内的文本片段，片段之间以空格分隔
    fn push_text(text_content: &mut String, fragment: &str) {
        if fragment.is_empty() {
            return;
        }
        if !text_content.is_empty() {
            text_content.push(' ');
        }
        text_content.push_str(fragment);
    }

    /// 解析package元素的version属性
    fn parse_package_version(e: &BytesStart) -> Result<Option<String>> {
        Self::find_attribute(e, b"version")
    }

    /// 解析spine元素的toc属性
    fn parse_spine_toc(e: &BytesStart) -> Result<Option<String>> {
        Self::find_attribute(e, b"toc")
    }

    fn find_attribute(e: &BytesStart, name: &[u8]) -> Result<Option<String>> {
        for attr_result in e.attributes() {
            let attr = attr_result.map_err(quick_xml::Error::InvalidAttr)?;
            if attr.key.local_name().as_ref() == name {
                return Ok(Some(attr.unescape_value()?.into_owned()));
            }
        }
        Ok(None)
    }

    /// 处理元数据元素的文本内容
    ///
    /// 注意：字段名使用local_name，`<dc:title>` 记为 "title"。空值被忽略。
    fn process_metadata_text(field: String, text_content: &str, metadata: &mut Metadata) {
        let content = text_content.trim();
        if content.is_empty() {
            log::debug!("忽略空的元数据字段: {}", field);
            return;
        }
        metadata.add_dublin_core(field, content);
    }

    /// 解析清单项
    fn parse_manifest_item(e: &BytesStart, manifest: &mut Manifest) -> Result<()> {
        let mut item = ManifestItem::new(String::new(), String::new(), String::new());

        for attr_result in e.attributes() {
            let attr = attr_result.map_err(quick_xml::Error::InvalidAttr)?;
            match attr.key.local_name().as_ref() {
                b"id" => {
                    item.id = attr.unescape_value()?.trim().to_string();
                }
                b"href" => {
                    item.href = attr.unescape_value()?.into_owned();
                }
                b"media-type" => {
                    item.media_type = attr.unescape_value()?.into_owned();
                }
                b"properties" => {
                    item.properties = Some(attr.unescape_value()?.into_owned());
                }
                _ => {}
            }
        }

        if !item.id.is_empty() && (item.href.is_empty() || item.media_type.is_empty()) {
            log::warn!(
                "清单项 {} 缺少href或media-type属性 (href: {:?}, media-type: {:?})",
                item.id,
                item.href,
                item.media_type
            );
        }

        manifest.insert(item)
    }

    /// 解析脊柱项
    fn parse_spine_item(e: &BytesStart, spine: &mut Spine) -> Result<()> {
        let mut idref = String::new();
        let mut linear = true;

        for attr_result in e.attributes() {
            let attr = attr_result.map_err(quick_xml::Error::InvalidAttr)?;
            match attr.key.local_name().as_ref() {
                b"idref" => {
                    idref = attr.unescape_value()?.trim().to_string();
                }
                b"linear" => {
                    linear = attr.unescape_value()?.trim() != "no";
                }
                _ => {}
            }
        }

        if idref.is_empty() {
            log::warn!("忽略缺少idref属性的脊柱项");
        } else {
            spine.items.push(SpineItem::with_linear(idref, linear));
        }

        Ok(())
    }

    /// 定位NCX导航文件对应的清单项
    ///
    /// 优先使用配置的清单ID；允许回退时依次尝试脊柱的toc属性和NCX媒体类型。
    pub fn navigation_item(&self, config: &ReaderConfig) -> Option<&ManifestItem> {
        if let Some(item) = self.manifest.get(&config.navigation_id) {
            return Some(item);
        }
        if !config.navigation_fallback {
            return None;
        }

        let from_spine = self
            .spine
            .toc
            .as_deref()
            .and_then(|toc_id| self.manifest.get(toc_id));
        if let Some(item) = from_spine {
            log::debug!("清单中没有 {}，使用脊柱toc属性指向的 {}", config.navigation_id, item.id);
            return Some(item);
        }

        self.manifest.iter().find(|item| item.is_ncx())
    }

    /// 获取所有线性阅读章节的清单项(按阅读顺序)，清单中不存在的ID被跳过
    pub fn linear_chapters(&self) -> Vec<&ManifestItem> {
        self.spine
            .items
            .iter()
            .filter(|spine_item| spine_item.linear)
            .filter_map(|spine_item| self.manifest.get(&spine_item.idref))
            .collect()
    }
}
