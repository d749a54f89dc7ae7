pub mod archive;
pub mod config;
pub mod engine;
pub mod error;
pub mod identifier;
pub mod render;
pub mod resolve;
pub mod template;
pub mod tree;

use std::path::{Component, Path, PathBuf};

use crate::archive::{ArchiveLoader, Artifact};
use crate::config::{load_settings, load_user_config, ScaffoldSettings, UserInput};
use crate::engine::{GenerationPlan, ScaffoldEngine};
use crate::error::{PlugforgeError, Result};
use crate::resolve::TokenSet;
use crate::template::{
    cached_fetcher_for, fetcher_for, get_cache_dir, resolve_source, TemplateFetcher, TemplateStore,
};

/// How to locate templates and settings for a session.
#[derive(Debug, Default)]
pub struct SessionOptions {
    /// Template source (URL pattern or local path). Falls back to the user config.
    pub source: Option<String>,
    /// Settings file. Falls back to the user config, then built-in defaults.
    pub settings: Option<PathBuf>,
    /// Skip the on-disk download cache.
    pub no_cache: bool,
}

/// A template store plus the engine that resolves its templates.
///
/// Loaded templates stay in memory for the lifetime of the session, so
/// repeated generations against one version fetch and decode it once.
pub struct Session {
    pub settings: ScaffoldSettings,
    store: TemplateStore,
    engine: ScaffoldEngine,
}

impl Session {
    pub fn open(options: SessionOptions) -> Result<Self> {
        let user_config = load_user_config()?.unwrap_or_default();

        let settings = match options.settings.or(user_config.settings) {
            Some(path) => load_settings(&path)?,
            None => ScaffoldSettings::default(),
        };

        let source = options
            .source
            .or(user_config.template_source)
            .ok_or(PlugforgeError::NoTemplateSource)?;
        let source = resolve_source(&source)?;

        let fetcher = if options.no_cache || !source.is_remote() {
            fetcher_for(&source)
        } else {
            cached_fetcher_for(&source, get_cache_dir()?)
        };

        Self::with_fetcher(settings, fetcher)
    }

    /// Build a session around an explicit fetcher and settings.
    pub fn with_fetcher(settings: ScaffoldSettings, fetcher: Box<dyn TemplateFetcher>) -> Result<Self> {
        settings.validate()?;
        let loader = ArchiveLoader::new(&settings)?;
        let engine = ScaffoldEngine::with_os_random(&settings);
        Ok(Self {
            store: TemplateStore::new(fetcher, loader),
            engine,
            settings,
        })
    }

    /// Replace the engine, e.g. to pin the clock or identifier source.
    pub fn with_engine(mut self, engine: ScaffoldEngine) -> Self {
        self.engine = engine;
        self
    }

    pub async fn tokens(&self, version: &str, input: &UserInput) -> Result<TokenSet> {
        let template = self.store.get(version).await?;
        self.engine.resolve(&template, input)
    }

    pub async fn plan(&self, version: &str, input: &UserInput) -> Result<GenerationPlan> {
        let template = self.store.get(version).await?;
        self.engine.plan(&template, input)
    }

    pub async fn generate(&self, version: &str, input: &UserInput) -> Result<Artifact> {
        let template = self.store.get(version).await?;
        self.engine.generate(template, input).await
    }
}

/// Write `artifact` into `output_dir`, returning the file path.
///
/// The artifact's file name must be a single plain path segment; anything
/// that would land outside `output_dir` is rejected.
pub async fn save_artifact(artifact: &Artifact, output_dir: &Path, overwrite: bool) -> Result<PathBuf> {
    let mut components = Path::new(&artifact.file_name).components();
    if !matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    ) {
        return Err(PlugforgeError::Validation {
            field: "file_name".into(),
            message: format!(
                "'{}' must be a plain file name inside the output directory",
                artifact.file_name
            ),
        });
    }

    let path = output_dir.join(&artifact.file_name);
    if path.exists() && !overwrite {
        return Err(PlugforgeError::OutputExists { path });
    }

    tokio::fs::create_dir_all(output_dir)
        .await
        .map_err(|e| PlugforgeError::Io {
            context: format!("creating output directory {}", output_dir.display()),
            source: e,
        })?;
    tokio::fs::write(&path, &artifact.bytes)
        .await
        .map_err(|e| PlugforgeError::Io {
            context: format!("writing {}", path.display()),
            source: e,
        })?;
    Ok(path)
}
