use std::io;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, EpubError>;

/// EPUB目录解析相关的错误类型
#[derive(Error, Debug)]
pub enum EpubError {
    #[error("IO错误: {0}")]
    Io(#[from] io::Error),

    #[error("XML解析错误: {0}")]
    XmlError(#[from] quick_xml::Error),

    #[error("缺少container.xml文件: {}", .0.display())]
    MissingContainerFile(PathBuf),

    #[error("container.xml格式错误: {0}")]
    MalformedContainer(String),

    #[error("缺少OPF包文件: {}", .0.display())]
    MissingPackageDocument(PathBuf),

    #[error("OPF包文件格式错误: {0}")]
    MalformedPackageDocument(String),

    #[error("无效的清单项: {0}")]
    InvalidManifestItem(String),

    #[error("缺少NCX导航文件: {0}")]
    MissingNavigationDocument(String),

    #[error("NCX导航文件格式错误: {0}")]
    MalformedNavigationDocument(String),

    #[error("导航点 {id} 的playOrder无效: {value:?}")]
    InvalidPlayOrder { id: String, value: String },

    #[error("配置文件错误: {0}")]
    ConfigError(String),

    #[error("序列化错误: {0}")]
    SerializeError(String),
}

impl EpubError {
    /// 将底层XML错误转换为指定阶段的格式错误，其余错误原样返回
    pub(crate) fn remap_xml(self, stage: fn(String) -> EpubError) -> EpubError {
        match self {
            EpubError::XmlError(err) => stage(err.to_string()),
            other => other,
        }
    }
}
