use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arc_swap::ArcSwap;
use tempfile::NamedTempFile;
use tokio::sync::watch;

use crate::error::ConfigError;
use crate::settings::Settings;

/// Hot-reloadable runtime configuration. Resolution precedence is
/// environment variable > settings file > built-in default. Every
/// successful write replaces the settings file atomically and, if an env
/// mirror path is configured, re-exports the merged settings there too, so
/// a restart without re-supplying env vars still sees the last-saved values.
pub struct ConfigCore {
    settings_path: PathBuf,
    env_mirror_path: Option<PathBuf>,
    current: ArcSwap<Settings>,
    tx: watch::Sender<Arc<Settings>>,
}

impl ConfigCore {
    pub fn load(settings_path: impl Into<PathBuf>, env_mirror_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let settings_path = settings_path.into();
        let settings = Self::resolve(&settings_path)?;
        let settings = Arc::new(settings);
        let (tx, _rx) = watch::channel(settings.clone());
        Ok(Self {
            settings_path,
            env_mirror_path,
            current: ArcSwap::from(settings),
            tx,
        })
    }

    fn resolve(settings_path: &Path) -> Result<Settings, ConfigError> {
        dotenvy::dotenv().ok();

        let builder = config::Config::builder()
            .add_source(
                config::File::with_name(&settings_path.to_string_lossy()).required(false),
            )
            .add_source(config::Environment::default());

        let built = builder.build().map_err(|e| ConfigError::Load(e.to_string()))?;
        built
            .try_deserialize::<Settings>()
            .or_else(|_| Ok(Settings::default()))
    }

    /// A lock-free snapshot of the current settings.
    pub fn current(&self) -> Arc<Settings> {
        self.current.load_full()
    }

    /// Subscribers receive the new settings every time `update` succeeds;
    /// components use this to rebind (Embedder, VectorIndex, LLMAdvisor).
    pub fn subscribe(&self) -> watch::Receiver<Arc<Settings>> {
        self.tx.subscribe()
    }

    pub fn update(&self, settings: Settings) -> Result<(), ConfigError> {
        self.persist(&settings)?;
        if let Some(mirror_path) = &self.env_mirror_path {
            self.mirror_env(mirror_path, &settings)?;
        }
        let settings = Arc::new(settings);
        self.current.store(settings.clone());
        let _ = self.tx.send(settings);
        Ok(())
    }

    fn persist(&self, settings: &Settings) -> Result<(), ConfigError> {
        let toml_str = toml::to_string_pretty(settings).map_err(|e| ConfigError::Persist {
            path: self.settings_path.display().to_string(),
            message: e.to_string(),
        })?;

        if let Some(parent) = self.settings_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| ConfigError::Persist {
                    path: self.settings_path.display().to_string(),
                    message: e.to_string(),
                })?;
            }
        }
        let dir = self
            .settings_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let mut tmp = NamedTempFile::new_in(dir).map_err(|e| ConfigError::Persist {
            path: self.settings_path.display().to_string(),
            message: e.to_string(),
        })?;
        tmp.write_all(toml_str.as_bytes())
            .map_err(|e| ConfigError::Persist {
                path: self.settings_path.display().to_string(),
                message: e.to_string(),
            })?;
        tmp.persist(&self.settings_path)
            .map_err(|e| ConfigError::Persist {
                path: self.settings_path.display().to_string(),
                message: e.to_string(),
            })?;
        Ok(())
    }

    /// Writes a `.env`-style mirror (`KEY=VALUE` per line) of every set
    /// field, so the next process start recovers the last-saved settings
    /// even without this settings file being sourced directly.
    fn mirror_env(&self, path: &Path, settings: &Settings) -> Result<(), ConfigError> {
        let mut lines = Vec::new();
        lines.push(format!("QDRANT_URL={}", settings.qdrant_url));
        if let Some(v) = &settings.qdrant_api_key {
            lines.push(format!("QDRANT_API_KEY={v}"));
        }
        lines.push(format!("QDRANT_COLLECTION={}", settings.qdrant_collection));
        lines.push(format!("EMBEDDING_MODEL_NAME={}", settings.embedding_model_name));
        lines.push(format!("EMBEDDING_DEVICE={}", settings.embedding_device));
        if let Some(v) = &settings.huggingface_access_token {
            lines.push(format!("HUGGINGFACE_ACCESS_TOKEN={v}"));
        }
        if let Some(v) = &settings.huggingface_provider {
            lines.push(format!("HUGGINGFACE_PROVIDER={v}"));
        }
        lines.push(format!("LLM_PROVIDER={}", settings.llm_provider));
        if let Some(v) = &settings.llm_api_key {
            lines.push(format!("LLM_API_KEY={v}"));
        }
        lines.push(format!("LLM_BASE_URL={}", settings.llm_base_url));
        lines.push(format!("LLM_MODEL={}", settings.llm_model));
        lines.push(format!("LLM_TEMPERATURE={}", settings.llm_temperature));
        lines.push(format!("BATCH_SIZE={}", settings.batch_size));
        lines.push(format!("DEFAULT_ROUTE_ID={}", settings.default_route_id));
        lines.push(format!("DEFAULT_ROUTE_NAME={}", settings.default_route_name));
        if let Some(v) = &settings.predict_auth_key {
            lines.push(format!("PREDICT_AUTH_KEY={v}"));
        }
        if let Some(v) = &settings.api_key {
            lines.push(format!("API_KEY={v}"));
        }
        lines.push(format!("ADMIN_USERNAME={}", settings.admin_username));
        if let Some(v) = &settings.admin_password {
            lines.push(format!("ADMIN_PASSWORD={v}"));
        }
        let content = lines.join("\n") + "\n";

        let dir = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or_else(|| Path::new("."));
        let mut tmp = NamedTempFile::new_in(dir).map_err(|e| ConfigError::Persist {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        tmp.write_all(content.as_bytes())
            .map_err(|e| ConfigError::Persist {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
        tmp.persist(path).map_err(|e| ConfigError::Persist {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let core = ConfigCore::load(dir.path().join("settings.toml"), None).unwrap();
        assert_eq!(core.current().batch_size, 64);
    }

    #[test]
    fn update_persists_and_is_visible_on_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        let core = ConfigCore::load(&path, None).unwrap();

        let mut settings = (*core.current()).clone();
        settings.batch_size = 128;
        core.update(settings).unwrap();
        assert_eq!(core.current().batch_size, 128);

        let reloaded = ConfigCore::load(&path, None).unwrap();
        assert_eq!(reloaded.current().batch_size, 128);
    }

    #[test]
    fn update_notifies_subscribers() {
        let dir = tempfile::tempdir().unwrap();
        let core = ConfigCore::load(dir.path().join("settings.toml"), None).unwrap();
        let mut rx = core.subscribe();

        let mut settings = (*core.current()).clone();
        settings.llm_provider = "deepseek".to_string();
        core.update(settings).unwrap();

        rx.has_changed().unwrap();
        let seen = rx.borrow_and_update();
        assert_eq!(seen.llm_provider, "deepseek");
    }

    #[test]
    fn update_writes_env_mirror_file() {
        let dir = tempfile::tempdir().unwrap();
        let mirror = dir.path().join(".env");
        let core = ConfigCore::load(dir.path().join("settings.toml"), Some(mirror.clone())).unwrap();

        let mut settings = (*core.current()).clone();
        settings.qdrant_url = "rocksdb://data".to_string();
        core.update(settings).unwrap();

        let content = std::fs::read_to_string(&mirror).unwrap();
        assert!(content.contains("QDRANT_URL=rocksdb://data"));
    }
}
