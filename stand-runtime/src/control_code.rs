//! # ControlCode 模块
//!
//! 从对话文本中提取立绘控制字符，并在文本送往渲染前将其移除。
//!
//! ## 控制字符
//!
//! | 写法 | 含义 |
//! |------|------|
//! | `\F[n]` | 立绘 1 显示列表 ID 为 n 的立绘 |
//! | `\M[s]` | 立绘 1 播放动作 s |
//! | `\FF[n]` | 立绘 2 显示列表 ID 为 n 的立绘 |
//! | `\MM[s]` | 立绘 2 播放动作 s |
//! | `\AA[n]` | 聚焦立绘 n（1 或 2），另一张变暗 |
//!
//! 提取区分大小写，且每种控制字符只取第一次出现；
//! 移除时不区分大小写，并移除所有出现。
//! 手写扫描，无正则依赖。

use crate::slot::SlotId;

/// 控制字符种类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CodeKind {
    SecondaryPicture,
    SecondaryMotion,
    Focus,
    PrimaryPicture,
    PrimaryMotion,
}

impl CodeKind {
    /// 匹配顺序：长名字优先，避免 `\F` 抢先匹配 `\FF`
    const ALL: [CodeKind; 5] = [
        CodeKind::SecondaryPicture,
        CodeKind::SecondaryMotion,
        CodeKind::Focus,
        CodeKind::PrimaryPicture,
        CodeKind::PrimaryMotion,
    ];

    fn name(self) -> &'static str {
        match self {
            CodeKind::SecondaryPicture => "FF",
            CodeKind::SecondaryMotion => "MM",
            CodeKind::Focus => "AA",
            CodeKind::PrimaryPicture => "F",
            CodeKind::PrimaryMotion => "M",
        }
    }

    /// 参数允许的字符：编号类为数字，动作类为 `[A-Za-z0-9_]`
    fn accepts(self, c: u8) -> bool {
        match self {
            CodeKind::PrimaryMotion | CodeKind::SecondaryMotion => {
                c.is_ascii_alphanumeric() || c == b'_'
            }
            _ => c.is_ascii_digit(),
        }
    }
}

/// 一次匹配
#[derive(Debug, Clone, Copy)]
struct CodeMatch<'a> {
    kind: CodeKind,
    start: usize,
    end: usize,
    arg: &'a str,
}

/// 尝试在 `start`（反斜杠位置）匹配指定种类的控制字符
fn match_at(text: &str, start: usize, kind: CodeKind, ignore_case: bool) -> Option<CodeMatch<'_>> {
    let bytes = text.as_bytes();
    let name = kind.name().as_bytes();
    let name_start = start + 1;
    let name_end = name_start + name.len();

    let candidate = bytes.get(name_start..name_end)?;
    let name_ok = if ignore_case {
        candidate.eq_ignore_ascii_case(name)
    } else {
        candidate == name
    };
    if !name_ok || bytes.get(name_end) != Some(&b'[') {
        return None;
    }

    let arg_start = name_end + 1;
    let arg_len = bytes[arg_start..]
        .iter()
        .take_while(|&&c| kind.accepts(c))
        .count();
    let arg_end = arg_start + arg_len;
    if arg_len == 0 || bytes.get(arg_end) != Some(&b']') {
        return None;
    }

    Some(CodeMatch {
        kind,
        start,
        end: arg_end + 1,
        arg: &text[arg_start..arg_end],
    })
}

/// 从左到右扫描所有不重叠的控制字符
fn scan(text: &str, ignore_case: bool) -> Vec<CodeMatch<'_>> {
    let mut matches = Vec::new();
    let mut pos = 0;

    while let Some(offset) = text[pos..].find('\\') {
        let start = pos + offset;
        match CodeKind::ALL
            .iter()
            .find_map(|&kind| match_at(text, start, kind, ignore_case))
        {
            Some(found) => {
                pos = found.end;
                matches.push(found);
            }
            None => pos = start + 1,
        }
    }

    matches
}

/// 单个槽位的指令
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotDirective {
    /// 立绘列表 ID
    pub picture_id: u32,
    /// 动作名（未指定时为 `None`）
    pub motion: Option<String>,
}

/// 一条消息中的全部立绘指令
///
/// `primary` / `secondary` 为 `None` 表示该槽位应淡出。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Directives {
    pub primary: Option<SlotDirective>,
    pub secondary: Option<SlotDirective>,
    pub focus: Option<SlotId>,
}

/// 提取控制字符（每种只取第一次出现）
pub fn parse(text: &str) -> Directives {
    let matches = scan(text, false);
    let first = |kind: CodeKind| matches.iter().find(|m| m.kind == kind).map(|m| m.arg);

    // 动作只在对应立绘指定时生效
    let slot = |picture: CodeKind, motion: CodeKind| {
        let picture_id = first(picture)?.parse::<u32>().ok()?;
        Some(SlotDirective {
            picture_id,
            motion: first(motion).map(str::to_string),
        })
    };

    Directives {
        primary: slot(CodeKind::PrimaryPicture, CodeKind::PrimaryMotion),
        secondary: slot(CodeKind::SecondaryPicture, CodeKind::SecondaryMotion),
        focus: first(CodeKind::Focus).and_then(|arg| match arg {
            "1" => Some(SlotId::Primary),
            "2" => Some(SlotId::Secondary),
            _ => None,
        }),
    }
}

/// 移除所有控制字符（不区分大小写），其他字符保持不变
pub fn strip(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for found in scan(text, true) {
        out.push_str(&text[last..found.start]);
        last = found.end;
    }
    out.push_str(&text[last..]);
    out
}

/// 解析后的消息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedMessage {
    pub directives: Directives,
    /// 移除控制字符后的文本
    pub text: String,
}

/// 提取指令并移除控制字符
pub fn parse_message(text: &str) -> ParsedMessage {
    ParsedMessage {
        directives: parse(text),
        text: strip(text),
    }
}
