//! OPF（Open Packaging Format）文件解析模块
//!
//! 此模块提供EPUB文件中OPF包文件的解析功能，包括元数据、清单、脊柱等信息的提取。

mod config;
mod metadata;
mod manifest;
mod spine;
mod parser;

pub use config::{DC_NAMESPACE, DEFAULT_NAVIGATION_ID, ReaderConfig};
pub use metadata::Metadata;
pub use manifest::{Manifest, ManifestItem, NCX_MEDIA_TYPE};
pub use spine::{Spine, SpineItem};
pub use parser::Opf;
