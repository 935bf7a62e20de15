//! Internationalization (i18n) for status and CLI messages
use phf::phf_map;
use serde::{Deserialize, Serialize};

/// Language options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Language {
    #[default]
    Japanese,
    English,
}

impl Language {
    /// Parse language from string, falling back to Japanese
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "en" | "english" => Self::English,
            _ => Self::Japanese,
        }
    }

    /// Get language code string
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Japanese => "ja",
            Self::English => "en",
        }
    }
}

/// Japanese messages
pub static MESSAGES_JA: phf::Map<&'static str, &'static str> = phf_map! {
    "probe_configured" => "Replicate API設定済み",
    "probe_not_configured" => "Replicate API未設定 - REPLICATE_API_TOKENを確認してください",
    "generating" => "画像生成中",
    "transferring" => "バーチャル試着中",
    "prompt" => "プロンプト",
    "person_image" => "人物画像",
    "garment_image" => "服の画像",
    "result_image" => "結果画像",
    "succeeded" => "成功",
    "failed" => "失敗",
    "status" => "接続状態",
};

/// English messages
pub static MESSAGES_EN: phf::Map<&'static str, &'static str> = phf_map! {
    "probe_configured" => "Replicate API configured",
    "probe_not_configured" => "Replicate API not configured - check REPLICATE_API_TOKEN",
    "generating" => "Generating image",
    "transferring" => "Running virtual try-on",
    "prompt" => "Prompt",
    "person_image" => "Person image",
    "garment_image" => "Garment image",
    "result_image" => "Result image",
    "succeeded" => "Succeeded",
    "failed" => "Failed",
    "status" => "Connection status",
};

/// Get the message table for a language
pub fn get_messages(lang: Language) -> &'static phf::Map<&'static str, &'static str> {
    match lang {
        Language::Japanese => &MESSAGES_JA,
        Language::English => &MESSAGES_EN,
    }
}

/// Get a single message, returning the key itself when it is unknown
pub fn get_message(key: &'static str, lang: Language) -> &'static str {
    get_messages(lang).get(key).copied().unwrap_or(key)
}
