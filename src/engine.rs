use std::sync::Arc;

use crate::archive::{ArchiveClock, ArchiveWriter, Artifact};
use crate::config::{ScaffoldSettings, UserInput};
use crate::error::{PlugforgeError, Result};
use crate::identifier::{IdentifierGenerator, OsRandomGenerator};
use crate::render::{render_tree, ContentProcessor, NamePlaceholder};
use crate::resolve::{ConfigurationResolver, TokenSet};
use crate::tree::FileTree;

/// A generation that has been resolved in memory but not yet serialized.
pub struct GenerationPlan {
    pub tokens: TokenSet,
    /// Directory wrapping every entry in the output archive.
    pub root_name: String,
    pub tree: FileTree,
}

/// Resolves a loaded template against user input and produces the archive.
///
/// The engine holds no per-request state; one instance can serve any
/// number of concurrent requests against the same shared template.
pub struct ScaffoldEngine {
    resolver: ConfigurationResolver,
    name_placeholder: String,
    archive_suffix: String,
    clock: Option<ArchiveClock>,
}

impl ScaffoldEngine {
    pub fn new(settings: &ScaffoldSettings, generator: Arc<dyn IdentifierGenerator>) -> Self {
        Self {
            resolver: ConfigurationResolver::new(settings, generator),
            name_placeholder: settings.name_placeholder_token(),
            archive_suffix: settings.archive_suffix.clone(),
            clock: None,
        }
    }

    pub fn with_os_random(settings: &ScaffoldSettings) -> Self {
        Self::new(settings, Arc::new(OsRandomGenerator))
    }

    pub fn with_year(mut self, year: i32) -> Self {
        self.resolver = self.resolver.with_year(year);
        self
    }

    /// Stamp archives with a fixed clock instead of the system time.
    pub fn with_clock(mut self, clock: ArchiveClock) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Resolve the token set for `input` against `template`.
    pub fn resolve(&self, template: &FileTree, input: &UserInput) -> Result<TokenSet> {
        self.resolver.resolve_with_revision(input, template.revision())
    }

    /// Resolve and substitute without serializing.
    pub fn plan(&self, template: &FileTree, input: &UserInput) -> Result<GenerationPlan> {
        let tokens = self.resolve(template, input)?;
        build_plan(tokens, template, &self.name_placeholder, &self.archive_suffix)
    }

    /// Serialize a plan into the output archive.
    pub fn write(&self, plan: &GenerationPlan) -> Result<Artifact> {
        self.writer().write(&plan.root_name, &plan.tree)
    }

    /// Produce the output archive for one request.
    ///
    /// Validation runs before any other work. Substitution and compression
    /// run on a blocking task; the shared template is only read.
    pub async fn generate(&self, template: Arc<FileTree>, input: &UserInput) -> Result<Artifact> {
        let tokens = self.resolve(&template, input)?;
        let placeholder = self.name_placeholder.clone();
        let suffix = self.archive_suffix.clone();
        let writer = self.writer();

        tokio::task::spawn_blocking(move || {
            let plan = build_plan(tokens, &template, &placeholder, &suffix)?;
            writer.write(&plan.root_name, &plan.tree)
        })
        .await
        .map_err(|e| PlugforgeError::TaskJoin {
            context: "generating output archive".into(),
            source: e,
        })?
    }

    fn writer(&self) -> ArchiveWriter {
        match self.clock {
            Some(clock) => ArchiveWriter::new(clock),
            None => ArchiveWriter::default(),
        }
    }
}

fn build_plan(
    tokens: TokenSet,
    template: &FileTree,
    placeholder: &str,
    suffix: &str,
) -> Result<GenerationPlan> {
    let name = tokens
        .get("name")
        .ok_or_else(|| PlugforgeError::missing_field("name"))?
        .to_string();
    let processor = ContentProcessor::new(&tokens);
    let tree = render_tree(
        template,
        &processor,
        &NamePlaceholder {
            token: placeholder,
            name: &name,
        },
    )?;

    Ok(GenerationPlan {
        root_name: format!("{name}{suffix}"),
        tokens,
        tree,
    })
}

#[cfg(test)]
mod tests {
    use std::io::{Cursor, Read};

    use chrono::{FixedOffset, TimeZone, Utc};
    use zip::ZipArchive;

    use super::*;
    use crate::tree::TemplateEntry;

    fn engine() -> ScaffoldEngine {
        ScaffoldEngine::with_os_random(&ScaffoldSettings::default())
            .with_year(2024)
            .with_clock(ArchiveClock::new(
                Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap(),
                FixedOffset::east_opt(0).unwrap(),
            ))
    }

    fn template() -> Arc<FileTree> {
        Arc::new(
            [
                TemplateEntry::new("src/__Plugin__/README", "Hello [-name-], target [-target-]"),
                TemplateEntry::new("source/version.h", "#define ID [-processor_uuid-]"),
            ]
            .into_iter()
            .collect(),
        )
    }

    fn foo_acme() -> UserInput {
        UserInput::new().with("name", "Foo").with("company", "Acme")
    }

    #[test]
    fn plan_substitutes_paths_and_content() {
        let plan = engine().plan(&template(), &foo_acme()).unwrap();
        assert_eq!(plan.root_name, "Foo-src");
        assert_eq!(
            plan.tree.get("src/Foo/README").unwrap().content,
            b"Hello Foo, target Acme_Foo"
        );
    }

    #[tokio::test]
    async fn generate_produces_named_archive() {
        let artifact = engine().generate(template(), &foo_acme()).await.unwrap();
        assert_eq!(artifact.file_name, "Foo-src.zip");

        let mut archive = ZipArchive::new(Cursor::new(artifact.bytes)).unwrap();
        let mut readme = String::new();
        archive
            .by_name("Foo-src/src/Foo/README")
            .unwrap()
            .read_to_string(&mut readme)
            .unwrap();
        assert_eq!(readme, "Hello Foo, target Acme_Foo");
    }

    #[tokio::test]
    async fn generate_rejects_missing_name_before_any_work() {
        let err = engine()
            .generate(template(), &UserInput::new().with("company", "Acme"))
            .await
            .unwrap_err();
        assert!(matches!(err, PlugforgeError::Validation { .. }));
    }

    #[tokio::test]
    async fn same_template_resolves_repeatedly_with_fresh_identifiers() {
        let engine = engine();
        let template = template();
        let before = (*template).clone();

        let first = engine.plan(&template, &foo_acme()).unwrap();
        let second = engine.plan(&template, &foo_acme()).unwrap();
        let header = |plan: &GenerationPlan| plan.tree.get("source/version.h").unwrap().content.clone();
        assert_ne!(header(&first), header(&second));

        let artifact = engine
            .generate(Arc::clone(&template), &UserInput::new().with("name", "Bar"))
            .await
            .unwrap();
        assert_eq!(artifact.file_name, "Bar-src.zip");
        assert_eq!(*template, before);
    }

    #[tokio::test]
    async fn concurrent_requests_share_one_template() {
        let engine = Arc::new(engine());
        let template = template();

        let tasks = (0..8).map(|i| {
            let engine = Arc::clone(&engine);
            let template = Arc::clone(&template);
            tokio::spawn(async move {
                let input = UserInput::new().with("name", format!("P{i}"));
                engine.generate(template, &input).await
            })
        });

        let results = futures::future::join_all(tasks).await;
        for (i, result) in results.into_iter().enumerate() {
            let artifact = result.unwrap().unwrap();
            assert_eq!(artifact.file_name, format!("P{i}-src.zip"));
        }
    }
}
