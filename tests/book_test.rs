//! 书籍模型的集成测试
//!
//! 每个测试都在临时目录中构造一个已解压的EPUB，再通过 `BookModel::initialize` 解析。

use std::fs;
use std::path::Path;

use bookdir::{BookModel, EpubError, ReaderConfig};
use tempfile::TempDir;

const CONTAINER_XML: &str = r#"<?xml version="1.0"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
  <rootfiles>
    <rootfile full-path="OEBPS/content.opf" media-type="application/oebps-package+xml"/>
  </rootfiles>
</container>"#;

const CONTENT_OPF: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<package xmlns="http://www.idpf.org/2007/opf" version="2.0" unique-identifier="bookid">
  <metadata xmlns:dc="http://purl.org/dc/elements/1.1/">
    <dc:title>The Sample Book</dc:title>
    <dc:creator>Ann Author</dc:creator>
    <dc:creator>Bob Writer</dc:creator>
    <dc:language>en</dc:language>
    <dc:identifier id="bookid">urn:uuid:0000-1111</dc:identifier>
  </metadata>
  <manifest>
    <item id="ncx" href="toc.ncx" media-type="application/x-dtbncx+xml"/>
    <item id="css" href="styles/main.css" media-type="text/css"/>
    <item id="ch1" href="text/ch1.xhtml" media-type="application/xhtml+xml"/>
    <item id="ch2" href="text/ch2.xhtml" media-type="application/xhtml+xml"/>
    <item id="ch10" href="text/Chapter%20Ten.xhtml" media-type="application/xhtml+xml"/>
  </manifest>
  <spine toc="ncx">
    <itemref idref="ch1"/>
    <itemref idref="ch2"/>
    <itemref idref="ch10"/>
  </spine>
</package>"#;

const TOC_NCX: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<ncx xmlns="http://www.daisy.org/z3986/2005/ncx/" version="2005-1">
  <docTitle><text>The Sample Book</text></docTitle>
  <navMap>
    <navPoint id="np1" playOrder="1"><navLabel><text>One</text></navLabel><content src="text/ch1.xhtml"/></navPoint>
    <navPoint id="np10" playOrder="10"><navLabel><text>Ten</text></navLabel><content src="text/Chapter%20Ten.xhtml"/></navPoint>
    <navPoint id="np2" playOrder="2"><navLabel><text>Two</text></navLabel><content src="text/ch2.xhtml#start"/></navPoint>
  </navMap>
</ncx>"#;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn write_file(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("创建目录失败");
    }
    fs::write(path, content).expect("写入文件失败");
}

/// 构造一个OPF位于 `OEBPS/` 下的完整示例书籍
fn sample_book() -> TempDir {
    init_logging();
    let dir = TempDir::new().expect("创建临时目录失败");
    write_file(dir.path(), "META-INF/container.xml", CONTAINER_XML);
    write_file(dir.path(), "OEBPS/content.opf", CONTENT_OPF);
    write_file(dir.path(), "OEBPS/toc.ncx", TOC_NCX);
    dir
}

fn container_for(full_path: &str) -> String {
    format!(
        r#"<container><rootfiles><rootfile full-path="{full_path}" media-type="application/oebps-package+xml"/></rootfiles></container>"#
    )
}

#[test]
fn test_initialize_sample_book() {
    let dir = sample_book();
    let book = BookModel::initialize(dir.path()).expect("解析示例书籍失败");

    assert_eq!(book.package_path(), "OEBPS/content.opf");
    assert_eq!(book.package_base_dir(), "OEBPS");
    assert_eq!(book.navigation_path(), "OEBPS/toc.ncx");
    assert_eq!(book.version(), Some("2.0"));

    assert_eq!(book.metadata("title"), Some("The Sample Book"));
    assert_eq!(book.metadata("creator"), Some("Ann Author"));
    assert_eq!(book.metadata_all("creator"), ["Ann Author", "Bob Writer"]);
    assert_eq!(book.metadata("subtitle"), None);
}

#[test]
fn test_manifest_lookup() {
    let dir = sample_book();
    let book = BookModel::initialize(dir.path()).unwrap();

    let ch2 = book.manifest_entry("ch2").unwrap();
    assert_eq!(ch2.href, "text/ch2.xhtml");
    assert_eq!(ch2.media_type, "application/xhtml+xml");
    assert!(book.manifest_entry("nope").is_none());
}

#[test]
fn test_manifest_by_type() {
    let dir = sample_book();
    let book = BookModel::initialize(dir.path()).unwrap();

    let chapters = book.manifest_by_type("application/xhtml+xml").unwrap();
    let ids: Vec<&str> = chapters.iter().map(|item| item.id.as_str()).collect();
    assert_eq!(ids, ["ch1", "ch2", "ch10"]);

    let css = book.manifest_by_type("text/css").unwrap();
    assert_eq!(css.len(), 1);

    assert!(book.manifest_by_type("image/png").is_none());
}

#[test]
fn test_toc_is_numerically_ordered() {
    let dir = sample_book();
    let book = BookModel::initialize(dir.path()).unwrap();

    let orders: Vec<i64> = book.toc().iter().map(|entry| entry.play_order).collect();
    assert_eq!(orders, [1, 2, 10]);

    let labels: Vec<&str> = book.toc().iter().map(|entry| entry.label.as_str()).collect();
    assert_eq!(labels, ["One", "Two", "Ten"]);
    assert_eq!(book.toc()[1].src, "text/ch2.xhtml#start");
    assert_eq!(book.toc_title(), Some("The Sample Book"));
}

#[test]
fn test_spine_order_is_document_order() {
    let dir = sample_book();
    let book = BookModel::initialize(dir.path()).unwrap();

    let idrefs: Vec<&str> = book.spine().iter().map(|item| item.idref.as_str()).collect();
    assert_eq!(idrefs, ["ch1", "ch2", "ch10"]);

    let hrefs: Vec<&str> = book.spine_entries().iter().map(|item| item.href.as_str()).collect();
    assert_eq!(hrefs, ["text/ch1.xhtml", "text/ch2.xhtml", "text/Chapter%20Ten.xhtml"]);
}

#[test]
fn test_resolve_href_decodes_and_strips_fragment() {
    let dir = sample_book();
    let book = BookModel::initialize(dir.path()).unwrap();

    assert_eq!(
        book.resolve_href("text/Chapter%20Ten.xhtml"),
        dir.path().join("OEBPS").join("text").join("Chapter Ten.xhtml")
    );
    assert_eq!(
        book.resolve_href("text/ch2.xhtml#start"),
        dir.path().join("OEBPS").join("text").join("ch2.xhtml")
    );
}

#[test]
fn test_initialize_is_idempotent() {
    let dir = sample_book();
    let first = BookModel::initialize(dir.path()).unwrap();
    let second = bookdir::open(dir.path()).unwrap();

    assert_eq!(first.toc(), second.toc());
    assert_eq!(first.metadata_table(), second.metadata_table());
    assert_eq!(first.manifest(), second.manifest());
    assert_eq!(first.spine(), second.spine());
    assert_eq!(first.package_base_dir(), second.package_base_dir());
    assert_eq!(first.to_yaml().unwrap(), second.to_yaml().unwrap());
}

#[test]
fn test_package_at_archive_root() {
    init_logging();
    let dir = TempDir::new().unwrap();
    write_file(dir.path(), "META-INF/container.xml", &container_for("content.opf"));
    write_file(dir.path(), "content.opf", CONTENT_OPF);
    write_file(dir.path(), "toc.ncx", TOC_NCX);

    let book = BookModel::initialize(dir.path()).unwrap();
    assert_eq!(book.package_base_dir(), "");
    assert_eq!(book.navigation_path(), "toc.ncx");
    assert_eq!(book.toc().len(), 3);
}

#[test]
fn test_missing_container_file() {
    init_logging();
    let dir = TempDir::new().unwrap();
    write_file(dir.path(), "OEBPS/content.opf", CONTENT_OPF);

    let err = BookModel::initialize(dir.path()).unwrap_err();
    assert!(matches!(err, EpubError::MissingContainerFile(_)), "{err:?}");
}

#[test]
fn test_malformed_container() {
    init_logging();
    let dir = TempDir::new().unwrap();
    write_file(dir.path(), "META-INF/container.xml", "<container><rootfiles></container>");

    let err = BookModel::initialize(dir.path()).unwrap_err();
    assert!(matches!(err, EpubError::MalformedContainer(_)), "{err:?}");
}

#[test]
fn test_missing_package_document() {
    init_logging();
    let dir = TempDir::new().unwrap();
    write_file(dir.path(), "META-INF/container.xml", CONTAINER_XML);

    let err = BookModel::initialize(dir.path()).unwrap_err();
    assert!(matches!(err, EpubError::MissingPackageDocument(_)), "{err:?}");
}

#[test]
fn test_malformed_package_document() {
    let dir = sample_book();
    write_file(dir.path(), "OEBPS/content.opf", "<package><manifest></package>");

    let err = BookModel::initialize(dir.path()).unwrap_err();
    assert!(matches!(err, EpubError::MalformedPackageDocument(_)), "{err:?}");
}

#[test]
fn test_manifest_item_without_id() {
    let dir = sample_book();
    let opf = CONTENT_OPF.replace(
        r#"<item id="css" href="styles/main.css""#,
        r#"<item href="styles/main.css""#,
    );
    write_file(dir.path(), "OEBPS/content.opf", &opf);

    let err = BookModel::initialize(dir.path()).unwrap_err();
    assert!(matches!(err, EpubError::InvalidManifestItem(_)), "{err:?}");
}

#[test]
fn test_missing_navigation_entry() {
    let dir = sample_book();
    let opf = CONTENT_OPF
        .replace(r#"<item id="ncx" href="toc.ncx" media-type="application/x-dtbncx+xml"/>"#, "")
        .replace(r#"<spine toc="ncx">"#, "<spine>");
    write_file(dir.path(), "OEBPS/content.opf", &opf);

    let err = BookModel::initialize(dir.path()).unwrap_err();
    assert!(matches!(err, EpubError::MissingNavigationDocument(_)), "{err:?}");
}

#[test]
fn test_missing_navigation_file() {
    let dir = sample_book();
    fs::remove_file(dir.path().join("OEBPS/toc.ncx")).unwrap();

    let err = BookModel::initialize(dir.path()).unwrap_err();
    assert!(matches!(err, EpubError::MissingNavigationDocument(_)), "{err:?}");
}

#[test]
fn test_malformed_navigation_document() {
    let dir = sample_book();
    write_file(dir.path(), "OEBPS/toc.ncx", "<ncx><navMap><navPoint></navMap></ncx>");

    let err = BookModel::initialize(dir.path()).unwrap_err();
    assert!(matches!(err, EpubError::MalformedNavigationDocument(_)), "{err:?}");
}

#[test]
fn test_navigation_file_is_not_ncx() {
    for content in ["this is not xml", "", "<html><body/></html>"] {
        let dir = sample_book();
        write_file(dir.path(), "OEBPS/toc.ncx", content);

        let err = BookModel::initialize(dir.path()).unwrap_err();
        assert!(matches!(err, EpubError::MalformedNavigationDocument(_)), "{content:?}: {err:?}");
    }
}

#[test]
fn test_truncated_documents() {
    let dir = sample_book();
    let cut = TOC_NCX.find("</navMap>").unwrap();
    write_file(dir.path(), "OEBPS/toc.ncx", &TOC_NCX[..cut]);
    let err = BookModel::initialize(dir.path()).unwrap_err();
    assert!(matches!(err, EpubError::MalformedNavigationDocument(_)), "{err:?}");

    let dir = sample_book();
    let cut = CONTENT_OPF.find("</manifest>").unwrap();
    write_file(dir.path(), "OEBPS/content.opf", &CONTENT_OPF[..cut]);
    let err = BookModel::initialize(dir.path()).unwrap_err();
    assert!(matches!(err, EpubError::MalformedPackageDocument(_)), "{err:?}");
}

#[test]
fn test_bad_nav_point_is_dropped() {
    let dir = sample_book();
    let ncx = TOC_NCX.replace(r#"playOrder="10""#, r#"playOrder="ten""#);
    write_file(dir.path(), "OEBPS/toc.ncx", &ncx);

    let book = BookModel::initialize(dir.path()).unwrap();
    let ids: Vec<&str> = book.toc().iter().map(|entry| entry.id.as_str()).collect();
    assert_eq!(ids, ["np1", "np2"]);

    let skipped = book.skipped_nav_points();
    assert_eq!(skipped.len(), 1);
    assert_eq!(skipped[0].id.as_deref(), Some("np10"));
}

#[test]
fn test_navigation_found_through_spine_toc() {
    let dir = sample_book();
    let opf = CONTENT_OPF
        .replace(r#"<item id="ncx" href="toc.ncx""#, r#"<item id="navigation" href="toc.ncx""#)
        .replace(r#"<spine toc="ncx">"#, r#"<spine toc="navigation">"#);
    write_file(dir.path(), "OEBPS/content.opf", &opf);

    let book = BookModel::initialize(dir.path()).unwrap();
    assert_eq!(book.toc().len(), 3);

    let strict = ReaderConfig {
        navigation_fallback: false,
        ..ReaderConfig::default()
    };
    let err = BookModel::initialize_with_config(dir.path(), &strict).unwrap_err();
    assert!(matches!(err, EpubError::MissingNavigationDocument(_)), "{err:?}");
}

#[test]
fn test_custom_navigation_id_from_config() {
    let dir = sample_book();
    let opf = CONTENT_OPF.replace(r#"<item id="ncx" href="toc.ncx""#, r#"<item id="toc" href="toc.ncx""#);
    write_file(dir.path(), "OEBPS/content.opf", &opf);
    write_file(dir.path(), "bookdir.yaml", "navigation_id: toc\nnavigation_fallback: false\n");

    let config = ReaderConfig::from_file(dir.path().join("bookdir.yaml")).unwrap();
    let book = BookModel::initialize_with_config(dir.path(), &config).unwrap();
    assert_eq!(book.toc().len(), 3);
}

#[test]
fn test_toc_tree_and_dump() {
    let dir = sample_book();
    let book = BookModel::initialize(dir.path()).unwrap();

    let tree = book.toc_tree();
    assert_eq!(tree.total_nodes(), 3);
    assert_eq!(tree.max_depth(), 1);

    let yaml = book.to_yaml().unwrap();
    assert!(yaml.contains("The Sample Book"));
    assert!(yaml.contains("base_dir: OEBPS"));
}
