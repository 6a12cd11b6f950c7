//! 扫描配置文件读取
//!
//! 配置文件为 JSON，只包含 `sampling` 与 `lightnessThreshold` 两个字段，
//! 缺省字段取默认值，读取后立即校验。

use std::fs;
use std::path::Path;

use crate::error::AppError;
use crate::image_handler::ScanConfig;

/// 读取并校验配置文件。
pub fn load_scan_config(path: &Path) -> Result<ScanConfig, AppError> {
    let content = fs::read_to_string(path)?;
    let config = serde_json::from_str::<ScanConfig>(&content)
        .map_err(|e| AppError::Settings(format!("解析配置文件失败: {}", e)))?;

    config.validate()?;

    log::info!(
        "⚙️ 已加载配置 {}（sampling={}, lightnessThreshold={}）",
        path.display(),
        config.sampling,
        config.lightness_threshold
    );
    Ok(config)
}

/// 有路径时读取配置文件，否则使用默认配置。
pub fn resolve_scan_config(path: Option<&Path>) -> Result<ScanConfig, AppError> {
    match path {
        Some(path) => load_scan_config(path),
        None => Ok(ScanConfig::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("yin-yang-{}-{}", std::process::id(), name))
    }

    #[test]
    fn test_resolve_without_path_uses_default() {
        assert_eq!(resolve_scan_config(None).unwrap(), ScanConfig::default());
    }

    #[test]
    fn test_load_reads_camel_case_fields() {
        let path = temp_path("settings-full.json");
        fs::write(&path, r#"{ "sampling": 5, "lightnessThreshold": 0.5 }"#).unwrap();

        let loaded = load_scan_config(&path).unwrap();
        let _ = fs::remove_file(&path);

        assert_eq!(
            loaded,
            ScanConfig {
                sampling: 5,
                lightness_threshold: 0.5,
            }
        );
    }

    #[test]
    fn test_load_rejects_malformed_json() {
        let path = temp_path("settings-malformed.json");
        fs::write(&path, "{ sampling: ").unwrap();

        let result = load_scan_config(&path);
        let _ = fs::remove_file(&path);

        assert!(matches!(result, Err(AppError::Settings(_))));
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        let path = temp_path("settings-invalid.json");
        fs::write(&path, r#"{ "sampling": 0 }"#).unwrap();

        let result = load_scan_config(&path);
        let _ = fs::remove_file(&path);

        assert!(matches!(result, Err(AppError::InvalidConfig(_))));
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let result = load_scan_config(&temp_path("does-not-exist.json"));
        assert!(matches!(result, Err(AppError::Io(_))));
    }
}
