//! NCX解析器模块
//!
//! 提供NCX（Navigation Control file for XML）文件的XML解析功能。
//! navMap中的所有navPoint（包括嵌套的）被展开为一个按playOrder数值升序排列的目录。

use crate::epub::error::{EpubError, Result};
use crate::epub::ncx::navigation::{PendingNavPoint, SkippedNavPoint, TocEntry};
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use serde::Serialize;

/// NCX文件解析结果
#[derive(Debug, Clone, Default, Serialize)]
pub struct Ncx {
    /// 文档标题(docTitle)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// 按playOrder排序的目录条目
    pub entries: Vec<TocEntry>,
    /// 因属性缺失或无效而被跳过的navPoint
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<SkippedNavPoint>,
}

impl Ncx {
    /// 解析NCX文件内容
    ///
    /// 单个navPoint的问题只会导致该条目被跳过并记录；XML本身的格式错误报告为
    /// `MalformedNavigationDocument`。
    ///
    /// # 参数
    /// * `xml_content` - NCX文件的XML内容
    ///
    /// # 返回值
    /// * `Result<Ncx>` - 解析后的NCX信息
    pub fn parse_xml(xml_content: &str) -> Result<Ncx> {
        Self::parse_document(xml_content)
            .map_err(|e| e.remap_xml(EpubError::MalformedNavigationDocument))
    }

    fn parse_document(xml_content: &str) -> Result<Ncx> {
        let mut reader = Reader::from_str(xml_content);
        reader.config_mut().trim_text(true);
        reader.config_mut().expand_empty_elements = true;

        let mut title = None;
        let mut entries: Vec<(usize, TocEntry)> = Vec::new();
        let mut skipped = Vec::new();

        let mut buf = Vec::new();
        let mut depth = 0usize;
        let mut found_ncx = false;
        let mut text_content = String::new();
        let mut in_nav_map = false;
        let mut in_doc_title = false;
        let mut in_nav_label = false;
        let mut nav_point_stack: Vec<PendingNavPoint> = Vec::new();
        let mut seq = 0usize;

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(ref e) => {
                    depth += 1;
                    if depth == 1 {
                        if e.local_name().as_ref() != b"ncx" {
                            return Err(EpubError::MalformedNavigationDocument(format!(
                                "根元素应为ncx，实际为 {}",
                                String::from_utf8_lossy(e.local_name().as_ref())
                            )));
                        }
                        found_ncx = true;
                    }

                    match e.local_name().as_ref() {
                        b"docTitle" if !in_nav_map => {
                            in_doc_title = true;
                        }
                        b"navMap" => {
                            in_nav_map = true;
                        }
                        b"navPoint" if in_nav_map => {
                            let mut nav_point = Self::parse_nav_point_attributes(e)?;
                            nav_point.seq = seq;
                            nav_point.depth = nav_point_stack.len() as u32 + 1;
                            seq += 1;
                            nav_point_stack.push(nav_point);
                        }
                        b"navLabel" if in_nav_map && !nav_point_stack.is_empty() => {
                            in_nav_label = true;
                        }
                        b"content" if in_nav_map => {
                            let src = Self::parse_content_src(e)?;
                            if let Some(nav_point) = nav_point_stack.last_mut() {
                                if nav_point.src.is_none() {
                                    nav_point.src = src;
                                }
                            }
                        }
                        b"text" => {
                            text_content.clear();
                        }
                        _ => {}
                    }
                }
                Event::End(ref e) => {
                    depth = depth.saturating_sub(1);
                    match e.local_name().as_ref() {
                        b"docTitle" => {
                            in_doc_title = false;
                        }
                        b"navMap" => {
                            in_nav_map = false;
                        }
                        b"text" if in_doc_title => {
                            if title.is_none() {
                                title = Some(text_content.trim().to_string());
                            }
                        }
                        b"text" if in_nav_label => {
                            if let Some(nav_point) = nav_point_stack.last_mut() {
                                if nav_point.label.is_none() {
                                    nav_point.label = Some(text_content.trim().to_string());
                                }
                            }
                        }
                        b"navLabel" => {
                            in_nav_label = false;
                        }
                        b"navPoint" if in_nav_map => {
                            if let Some(pending) = nav_point_stack.pop() {
                                match Self::finish_nav_point(pending) {
                                    Ok(entry) => entries.push(entry),
                                    Err(skip) => {
                                        log::warn!(
                                            "跳过navPoint {}: {}",
                                            skip.id.as_deref().unwrap_or("<无id>"),
                                            skip.reason
                                        );
                                        skipped.push(skip);
                                    }
                                }
                            }
                        }
                        _ => {}
                    }
                }
                Event::Text(e) if depth == 0 => {
                    return Err(EpubError::MalformedNavigationDocument(format!(
                        "根元素之外存在文本: {:?}",
                        String::from_utf8_lossy(&e)
                    )));
                }
                Event::Text(e) => {
                    Self::push_text(&mut text_content, &e.unescape()?);
                }
                Event::CData(e) => {
                    Self::push_text(&mut text_content, &String::from_utf8_lossy(&e));
                }
                Event::Eof => {
                    if depth != 0 {
                        return Err(EpubError::MalformedNavigationDocument(format!(
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

        if !found_ncx {
            return Err(EpubError::MalformedNavigationDocument(
                "没有找到ncx根元素".to_string(),
            ));
        }

        // 按playOrder数值升序排序，相同playOrder保持文档顺序
        entries.sort_by_key(|(seq, entry)| (entry.play_order, *seq));
        let entries: Vec<TocEntry> = entries.into_iter().map(|(_, entry)| entry).collect();

        log::debug!(
            "NCX解析完成: {} 个目录条目, {} 个被跳过",
            entries.len(),
            skipped.len()
        );

        Ok(Ncx {
            title,
            entries,
            skipped,
        })
    }

    /// 拼接文本片段，片段之间以空格分隔
    fn push_text(text_content: &mut String, fragment: &str) {
        if fragment.is_empty() {
            return;
        }
        if !text_content.is_empty() {
            text_content.push(' ');
        }
        text_content.push_str(fragment);
    }

    /// 校验已闭合的navPoint，缺少必要属性或playOrder不是数字时返回跳过记录
    fn finish_nav_point(
        pending: PendingNavPoint,
    ) -> std::result::Result<(usize, TocEntry), SkippedNavPoint> {
        let id = match pending.id.filter(|id| !id.is_empty()) {
            Some(id) => id,
            None => {
                return Err(SkippedNavPoint {
                    id: None,
                    reason: "缺少id属性".to_string(),
                });
            }
        };

        let raw_play_order = match pending.play_order {
            Some(value) => value,
            None => {
                return Err(SkippedNavPoint {
                    id: Some(id),
                    reason: "缺少playOrder属性".to_string(),
                });
            }
        };

        let play_order = match raw_play_order.trim().parse::<i64>() {
            Ok(value) => value,
            Err(_) => {
                let reason = EpubError::InvalidPlayOrder {
                    id: id.clone(),
                    value: raw_play_order,
                }
                .to_string();
                return Err(SkippedNavPoint { id: Some(id), reason });
            }
        };

        let src = match pending.src.filter(|src| !src.is_empty()) {
            Some(src) => src,
            None => {
                return Err(SkippedNavPoint {
                    id: Some(id),
                    reason: "缺少content的src属性".to_string(),
                });
            }
        };

        Ok((
            pending.seq,
            TocEntry {
                id,
                play_order,
                label: pending.label.unwrap_or_default(),
                src,
                depth: pending.depth,
            },
        ))
    }

    /// 解析navPoint元素的属性
    fn parse_nav_point_attributes(e: &BytesStart) -> Result<PendingNavPoint> {
        let mut nav_point = PendingNavPoint::default();

        for attr_result in e.attributes() {
            let attr = attr_result.map_err(quick_xml::Error::InvalidAttr)?;
            match attr.key.local_name().as_ref() {
                b"id" => {
                    nav_point.id = Some(attr.unescape_value()?.trim().to_string());
                }
                b"playOrder" => {
                    nav_point.play_order = Some(attr.unescape_value()?.into_owned());
                }
                _ => {}
            }
        }

        Ok(nav_point)
    }

    /// 解析content元素的src属性
    fn parse_content_src(e: &BytesStart) -> Result<Option<String>> {
        for attr_result in e.attributes() {
            let attr = attr_result.map_err(quick_xml::Error::InvalidAttr)?;
            if attr.key.local_name().as_ref() == b"src" {
                return Ok(Some(attr.unescape_value()?.trim().to_string()));
            }
        }
        Ok(None)
    }

    /// 根据ID查找目录条目
    pub fn find_entry_by_id(&self, id: &str) -> Option<&TocEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }
}
