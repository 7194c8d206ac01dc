use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::types::{OrderingPolicy, Tone};

pub const ENV_BASE_URL: &str = "PHRASER_BASE_URL";
pub const ENV_TIMEOUT_SECS: &str = "PHRASER_TIMEOUT_SECS";

/// 設定エラー
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Failed to read settings file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid settings file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("Invalid value for {key}: {value}")]
    InvalidEnv { key: &'static str, value: String },
}

/// アプリケーション設定
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PhraserSettings {
    /// リライトサービスのベースURL（パスは固定）
    pub base_url: String,
    /// HTTPクライアントのタイムアウト（秒）
    pub timeout_secs: u64,
    /// 重なったリクエストの結果の適用順
    pub ordering: OrderingPolicy,
    /// 起動時のトーン
    pub default_tone: Tone,
    /// リライター選択
    pub rewriter: RewriterChoice,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewriterChoice {
    Http,
    /// オフライン確認用（入力をそのまま返す）
    Noop,
}

impl Default for PhraserSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            timeout_secs: 30,
            ordering: OrderingPolicy::ArrivalOrder,
            default_tone: Tone::Standard,
            rewriter: RewriterChoice::Http,
        }
    }
}

impl PhraserSettings {
    /// 既定の設定ファイルパス（~/.config/phraser/settings.json 相当）
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("phraser").join("settings.json"))
    }

    /// JSON ファイルから読み込む（未指定キーはデフォルト）
    pub fn from_file(path: &Path) -> Result<Self, SettingsError> {
        let raw = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// デフォルト → ファイル → 環境変数 の順で解決する
    ///
    /// `path` が指定されていればそのファイルは必須。未指定なら既定パスに
    /// ファイルがある場合のみ読む。
    pub fn load(path: Option<&Path>) -> Result<Self, SettingsError> {
        Self::load_with(path, |key| std::env::var(key).ok())
    }

    /// `load` と同じ。環境変数の取得関数を差し替えられる
    pub fn load_with<F>(path: Option<&Path>, lookup: F) -> Result<Self, SettingsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = match path {
            Some(p) => Self::from_file(p)?,
            None => match Self::default_path().filter(|p| p.exists()) {
                Some(p) => {
                    log::debug!("設定ファイル読み込み: {}", p.display());
                    Self::from_file(&p)?
                }
                None => Self::default(),
            },
        };
        settings.apply_env(lookup)?;
        Ok(settings)
    }

    /// 環境変数による上書き。テストのため取得関数を注入できる
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), SettingsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_BASE_URL) {
            self.base_url = url;
        }
        if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
            self.timeout_secs = raw.parse().map_err(|_| SettingsError::InvalidEnv {
                key: ENV_TIMEOUT_SECS,
                value: raw.clone(),
            })?;
        }
        Ok(())
    }

    /// エンドポイントURL
    pub fn endpoint(&self) -> String {
        format!("{}/api/Parapharser", self.base_url.trim_end_matches('/'))
    }
}
