//! # Error 模块
//!
//! 定义 stand-runtime 中使用的错误类型。
//!
//! 注意：帧内逻辑（条件求值、模式解析、槽位动画）从不返回错误，
//! 失败一律在本地吸收。这里的错误只来自配置加载和运行时命令的参数校验。

use thiserror::Error;

/// 配置错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// 读取配置文件失败
    #[error("配置 IO 错误: {path} - {message}")]
    Io { path: String, message: String },

    /// JSON 解析失败
    #[error("配置解析失败: {0}")]
    Parse(String),

    /// 配置校验失败
    #[error("配置验证失败: {0}")]
    Validation(String),
}

/// 色调参数越界
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ToneError {
    /// RGB 通道超出 -255..=255
    #[error("色调通道 {channel} 的值 {value} 超出范围 -255..=255")]
    ChannelOutOfRange { channel: char, value: i32 },

    /// 灰度超出 0..=255
    #[error("灰度值 {0} 超出范围 0..=255")]
    GrayOutOfRange(i32),
}

/// 图片资源加载失败（由宿主在加载回调中报告）
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LoadError {
    /// 资源未找到
    #[error("立绘资源未找到: {image}")]
    NotFound { image: String },

    /// 解码或读取失败
    #[error("立绘资源加载失败: {image} - {message}")]
    Failed { image: String, message: String },
}

/// stand-runtime 统一错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StandError {
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),

    /// 运行时命令参数错误
    #[error("色调错误: {0}")]
    Tone(#[from] ToneError),
}

/// Result 类型别名
pub type StandResult<T> = Result<T, StandError>;
