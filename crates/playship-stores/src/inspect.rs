//! Package name extraction from Android binaries

use crate::error::{Result, StoreError};
use crate::types::BinaryKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Reads the application id out of an APK or app bundle.
#[async_trait::async_trait]
pub trait PackageInspector: Send + Sync {
    async fn package_name(&self, binary: &Path) -> Result<String>;
}

/// Inspector that always reports a configured package name.
#[derive(Debug, Clone)]
pub struct StaticPackageName(pub String);

#[async_trait::async_trait]
impl PackageInspector for StaticPackageName {
    async fn package_name(&self, _binary: &Path) -> Result<String> {
        Ok(self.0.clone())
    }
}

/// Inspector backed by the Android build tools.
///
/// APKs are read with `aapt2 dump badging`, bundles with
/// `bundletool dump manifest`.
#[derive(Debug, Clone, Default)]
pub struct ToolInspector {
    aapt2: Option<PathBuf>,
    bundletool: Option<PathBuf>,
}

impl ToolInspector {
    /// Locate the tools on `PATH`
    pub fn from_path() -> Self {
        Self {
            aapt2: which::which("aapt2").ok(),
            bundletool: which::which("bundletool").ok(),
        }
    }

    /// Use explicit tool locations
    pub fn with_tools(aapt2: Option<PathBuf>, bundletool: Option<PathBuf>) -> Self {
        Self { aapt2, bundletool }
    }

    async fn run(tool: &Path, args: &[&str]) -> Result<String> {
        debug!(tool = %tool.display(), ?args, "Inspecting binary");

        let output = tokio::process::Command::new(tool)
            .args(args)
            .output()
            .await
            .map_err(|e| StoreError::CommandFailed(format!("{}: {}", tool.display(), e)))?;

        if !output.status.success() {
            return Err(StoreError::CommandFailed(format!(
                "{} exited with {}: {}",
                tool.display(),
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[async_trait::async_trait]
impl PackageInspector for ToolInspector {
    async fn package_name(&self, binary: &Path) -> Result<String> {
        if !binary.is_file() {
            return Err(StoreError::InvalidArtifact(format!(
                "{} does not exist",
                binary.display()
            )));
        }
        let binary_arg = binary.to_string_lossy();

        let package = match BinaryKind::from_path(binary) {
            BinaryKind::Apk => {
                let tool = self
                    .aapt2
                    .as_deref()
                    .ok_or_else(|| StoreError::ToolNotFound("aapt2".to_string()))?;
                let stdout = Self::run(tool, &["dump", "badging", &binary_arg]).await?;
                parse_badging(&stdout)
            }
            BinaryKind::Bundle => {
                let tool = self
                    .bundletool
                    .as_deref()
                    .ok_or_else(|| StoreError::ToolNotFound("bundletool".to_string()))?;
                let bundle_arg = format!("--bundle={}", binary_arg);
                let stdout = Self::run(
                    tool,
                    &["dump", "manifest", &bundle_arg, "--xpath", "/manifest/@package"],
                )
                .await?;
                parse_manifest_xpath(&stdout)
            }
        };

        package.ok_or_else(|| {
            StoreError::InvalidArtifact(format!(
                "Could not determine package name from {}",
                binary.display()
            ))
        })
    }
}

/// Extract `name='...'` from the `package:` line of `aapt2 dump badging`
pub fn parse_badging(output: &str) -> Option<String> {
    let line = output.lines().find(|l| l.starts_with("package:"))?;
    line.split_whitespace()
        .find_map(|part| part.strip_prefix("name='"))
        .map(|name| name.trim_end_matches('\'').to_string())
        .filter(|name| !name.is_empty())
}

/// First non-empty line printed by `bundletool dump manifest --xpath`
pub fn parse_manifest_xpath(output: &str) -> Option<String> {
    output
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_badging() {
        let output = "package: name='com.example.app' versionCode='42' versionName='1.2.0'\n\
                      sdkVersion:'24'\n\
                      application-label:'Example'\n";
        assert_eq!(parse_badging(output), Some("com.example.app".to_string()));
    }

    #[test]
    fn test_parse_badging_without_package_line() {
        assert_eq!(parse_badging("sdkVersion:'24'\n"), None);
        assert_eq!(parse_badging("package: name='' versionCode='1'"), None);
    }

    #[test]
    fn test_parse_manifest_xpath() {
        assert_eq!(
            parse_manifest_xpath("\ncom.example.bundle\n"),
            Some("com.example.bundle".to_string())
        );
        assert_eq!(parse_manifest_xpath("  \n"), None);
    }

    #[tokio::test]
    async fn test_static_package_name() {
        let inspector = StaticPackageName("com.example.app".to_string());
        let name = inspector.package_name(Path::new("whatever.apk")).await.unwrap();
        assert_eq!(name, "com.example.app");
    }

    #[tokio::test]
    async fn test_missing_binary() {
        let inspector = ToolInspector::with_tools(None, None);
        let result = inspector.package_name(Path::new("/nonexistent/app.apk")).await;
        assert!(matches!(result, Err(StoreError::InvalidArtifact(_))));
    }

    #[tokio::test]
    async fn test_missing_tool() {
        let temp = TempDir::new().unwrap();
        let bundle = temp.path().join("app.aab");
        std::fs::write(&bundle, b"bundle").unwrap();

        let inspector = ToolInspector::with_tools(None, None);
        let result = inspector.package_name(&bundle).await;
        assert!(matches!(result, Err(StoreError::ToolNotFound(tool)) if tool == "bundletool"));
    }
}
