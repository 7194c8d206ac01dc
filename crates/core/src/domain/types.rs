use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// 入力テキストの最大文字数（入力境界で切り詰める）
pub const MAX_INPUT_CHARS: usize = 2000;

/// リライトのトーン（タブの並び順どおり）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Tone {
    #[default]
    Standard,
    Fluency,
    Formal,
    Simple,
    Creative,
    Summarize,
}

impl Tone {
    pub const ALL: [Tone; 6] = [
        Tone::Standard,
        Tone::Fluency,
        Tone::Formal,
        Tone::Simple,
        Tone::Creative,
        Tone::Summarize,
    ];

    /// リライトサービスに送る名前
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Standard => "Standard",
            Self::Fluency => "Fluency",
            Self::Formal => "Formal",
            Self::Simple => "Simple",
            Self::Creative => "Creative",
            Self::Summarize => "Summarize",
        }
    }

    /// タブ番号
    pub fn index(&self) -> usize {
        Self::ALL
            .iter()
            .position(|t| t == self)
            .unwrap_or_default()
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown tone: {0}")]
pub struct UnknownTone(pub String);

impl FromStr for Tone {
    type Err = UnknownTone;

    /// 名前（大文字小文字を区別しない）またはタブ番号を受け付ける
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(index) = trimmed.parse::<usize>() {
            return Self::from_index(index).ok_or_else(|| UnknownTone(trimmed.to_string()));
        }
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| UnknownTone(trimmed.to_string()))
    }
}

/// ロケールヒント。現状は British 固定
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Dialect {
    #[default]
    British,
}

impl Dialect {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::British => "British",
        }
    }
}

/// レスポンス適用順序ポリシー
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderingPolicy {
    /// 後から届いたレスポンスが常に上書きする
    #[default]
    ArrivalOrder,
    /// 最後に適用したものより古いリクエストの結果は捨てる
    IssueOrder,
}

impl OrderingPolicy {
    /// 設定ファイルと同じ表記
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ArrivalOrder => "arrival_order",
            Self::IssueOrder => "issue_order",
        }
    }
}

/// 入力境界での切り詰め（文字単位）
pub fn clamp_input(text: &str) -> String {
    match text.char_indices().nth(MAX_INPUT_CHARS) {
        Some((byte_idx, _)) => text[..byte_idx].to_string(),
        None => text.to_string(),
    }
}
