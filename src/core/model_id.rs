use std::collections::HashMap;

pub const DEFAULT_NAMESPACE: &str = "Qwen";

/// 本地目錄名稱對應的遠端模型 ID
const KNOWN_MODELS: &[(&str, &str)] = &[
    ("Qwen3-TTS-12Hz-0.6B-Base", "Qwen/Qwen3-TTS-12Hz-0.6B-Base"),
    (
        "Qwen3-TTS-12Hz-0.6B-CustomVoice",
        "Qwen/Qwen3-TTS-12Hz-0.6B-CustomVoice",
    ),
    ("Qwen3-TTS-12Hz-1.7B-Base", "Qwen/Qwen3-TTS-12Hz-1.7B-Base"),
    (
        "Qwen3-TTS-12Hz-1.7B-CustomVoice",
        "Qwen/Qwen3-TTS-12Hz-1.7B-CustomVoice",
    ),
    (
        "Qwen3-TTS-12Hz-1.7B-VoiceDesign",
        "Qwen/Qwen3-TTS-12Hz-1.7B-VoiceDesign",
    ),
];

/// 取出路徑最後一段（先去掉結尾的 `/`）
pub fn model_name(model_path: &str) -> &str {
    let trimmed = model_path.trim_end_matches('/');
    trimmed.rsplit('/').next().unwrap_or(trimmed)
}

/// 設定中的別名優先，其次是內建表，最後用 `<namespace>/<name>`
pub fn resolve_model_id(
    model_path: &str,
    aliases: &HashMap<String, String>,
    namespace: &str,
) -> String {
    let name = model_name(model_path);

    if let Some(alias) = aliases.get(name) {
        return alias.clone();
    }

    KNOWN_MODELS
        .iter()
        .find(|(known, _)| *known == name)
        .map(|(_, id)| id.to_string())
        .unwrap_or_else(|| format!("{}/{}", namespace, name))
}
