//! 打印所有指令的渲染器
//!
//! 图片加载在下一帧完成：`load_image` 只登记请求，
//! 宿主循环在帧开始时取出并回报给 Overlay。

use std::collections::{BTreeMap, HashSet};

use stand_runtime::{
    ImageSize, LoadError, PictureParams, Placement, RenderTarget, Renderer, Tone,
};
use tracing::{debug, info};

/// 一次已完成的加载
pub type CompletedLoad = (RenderTarget, String, Result<ImageSize, LoadError>);

#[derive(Debug)]
pub struct LoggingRenderer {
    image_size: ImageSize,
    failing: HashSet<String>,
    pending: Vec<(RenderTarget, String)>,
    /// 每种指令的调用次数
    counts: BTreeMap<&'static str, usize>,
}

impl LoggingRenderer {
    pub fn new(image_size: ImageSize) -> Self {
        Self {
            image_size,
            failing: HashSet::new(),
            pending: Vec::new(),
            counts: BTreeMap::new(),
        }
    }

    /// 之后对该图片的加载都会失败
    pub fn fail_image(&mut self, image: impl Into<String>) {
        self.failing.insert(image.into());
    }

    /// 取出上一帧登记的加载请求并给出结果
    pub fn complete_loads(&mut self) -> Vec<CompletedLoad> {
        std::mem::take(&mut self.pending)
            .into_iter()
            .map(|(target, image)| {
                let result = if self.failing.contains(&image) {
                    Err(LoadError::NotFound {
                        image: image.clone(),
                    })
                } else {
                    Ok(self.image_size)
                };
                (target, image, result)
            })
            .collect()
    }

    pub fn counts(&self) -> &BTreeMap<&'static str, usize> {
        &self.counts
    }

    fn count(&mut self, kind: &'static str) {
        *self.counts.entry(kind).or_default() += 1;
    }
}

impl Renderer for LoggingRenderer {
    fn show(&mut self, target: RenderTarget, params: &PictureParams) {
        self.count("show");
        info!(
            ?target,
            image = %params.image,
            x = params.x,
            y = params.y,
            scale_x = params.scale_x,
            scale_y = params.scale_y,
            opacity = params.opacity,
            blend = ?params.blend_mode,
            "show"
        );
    }

    fn move_to(&mut self, target: RenderTarget, placement: Placement, duration_ticks: u32) {
        self.count("move");
        debug!(
            ?target,
            x = placement.x,
            y = placement.y,
            opacity = placement.opacity,
            duration_ticks,
            "move"
        );
    }

    fn tint(&mut self, target: RenderTarget, tone: Tone, duration_ticks: u32) {
        self.count("tint");
        info!(?target, tone = ?tone.to_array(), duration_ticks, "tint");
    }

    fn erase(&mut self, target: RenderTarget) {
        self.count("erase");
        info!(?target, "erase");
    }

    fn load_image(&mut self, target: RenderTarget, image: &str) {
        self.count("load");
        debug!(?target, image, "load");
        self.pending.push((target, image.to_string()));
    }
}
