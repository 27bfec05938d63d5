//! Site building orchestration.
//!
//! Build pipeline phases:
//! - **Init** - clean and create output/temp directories
//! - **Compile** - page and root modules into the temp tree (fatal on error)
//! - **Partials** - string phase, scan phase, hydrate groups
//! - **Assets** - client entries, shared bundle, hydrate bundles, tag list
//! - **Pages** - resolve routes, render and write every page concurrently
//! - **Search** - index the pages written by this build
//!
//! Every stage is joined before the next one starts, so the search stage
//! only ever reads fully written pages. Only compile failures abort; page
//! and artifact failures are collected into [`BuildSummary::errors`] and
//! reported together at the end.

use crate::{
    asset::{EmitReport, build_assets_tag_array, client_entries, emit_client_entry},
    compiler::{BundleOptions, CompileOptions, Compiler, collect_all_files},
    config::SiteConfig,
    error::BuildError,
    log,
    logger::ProgressLine,
    module::{ModuleLoader, RootModule},
    page::{PageJob, PageReport, RenderContext, build_page, out_file_for},
    partial::{
        HYDRATE_PAGES, HydrateGroup, PartialStrings, STRING_INITIAL, build_partial_modules,
        build_partial_strings, collect_partial_entries, emit_hydrate_groups, group_pages,
        partial_patterns, save_groups, scan_module,
    },
    search::{SearchIndex, build_search_json, collect_page_files},
    utils::plural_count,
};
use anyhow::{Context, Result, bail};
use futures::future::join_all;
use std::{fs, path::PathBuf};

/// What a finished build produced.
#[derive(Debug, Default)]
pub struct BuildSummary {
    pub written: Vec<PathBuf>,
    pub drafts: usize,
    pub groups: Vec<HydrateGroup>,
    pub search: Option<SearchIndex>,
    pub errors: Vec<BuildError>,
}

impl BuildSummary {
    fn absorb(&mut self, report: PageReport) {
        self.written.extend(report.written);
        self.drafts += report.drafts;
        self.errors.extend(report.errors);
    }
}

/// Build the site on a current-thread runtime and report the outcome.
///
/// Fails when the build aborted or any page failed.
pub fn run_build(config: &SiteConfig, compiler: &dyn Compiler, loader: &dyn ModuleLoader) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let summary = runtime.block_on(build_site(config, compiler, loader))?;
    finish(&summary)
}

/// Rebuild only the search index from the pages already in the output.
pub fn run_search(config: &SiteConfig) -> Result<()> {
    let pages = collect_page_files(&config.build.output);
    if pages.is_empty() {
        bail!("no pages found in {}, run `islet build` first", config.build.output.display());
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let out_file = config.search_output();
    runtime.block_on(build_search_json(
        &config.search,
        false,
        &pages,
        &config.build.output,
        &out_file,
    ))?;
    log!("search"; "indexed {}", plural_count(pages.len(), "page"));
    Ok(())
}

/// Run every build stage in order.
pub async fn build_site(
    config: &SiteConfig,
    compiler: &dyn Compiler,
    loader: &dyn ModuleLoader,
) -> Result<BuildSummary> {
    init_build(config)?;
    let mut summary = BuildSummary::default();

    // Compile
    let pages = collect_page_sources(config);
    let compiled = compile_modules(config, compiler, &pages)?;
    crate::debug!("build"; "compiled {}", plural_count(compiled.pages.len(), "page module"));

    let root = match &compiled.root {
        Some(path) => RootModule::resolve(loader.load(path)?)
            .await
            .with_context(|| format!("failed to resolve root module {}", path.display()))?,
        None => RootModule::identity(),
    };

    // Partials
    let (strings, groups) = build_partials(config, compiler, loader, &compiled, &mut summary.errors)?;

    // Assets
    let options = BundleOptions {
        out_dir: config.assets_dir(),
        minify: config.assets.minify,
    };
    let mut emitted = EmitReport::default();
    for entry in client_entries(config) {
        emitted.absorb(emit_client_entry(compiler, &entry, &options)?);
    }
    emitted.absorb(emit_hydrate_groups(compiler, &groups, &config.assets.partial, &options)?);
    let entry_points = emitted.written;
    summary.errors.extend(emitted.errors);
    let tags = build_assets_tag_array(
        &entry_points,
        &config.build.output,
        &config.build.base,
        &config.assets.entries,
        &[config.assets.bundle_pattern()],
        &partial_patterns(&groups),
    );

    // Pages
    let mut jobs = Vec::with_capacity(compiled.pages.len());
    for (source, module_path) in pages.iter().zip(&compiled.pages) {
        match loader.load(module_path) {
            Ok(module) => jobs.push(PageJob {
                source: source.clone(),
                module,
                out_file: out_file_for(module_path, &config.build.temp_pages(), &config.build.output),
            }),
            Err(source_err) => summary.errors.push(BuildError::Render {
                page: source.clone(),
                source: source_err,
            }),
        }
    }

    let ctx = RenderContext {
        root: &root,
        partials: &strings,
        assets: &tags,
        out_base: &config.build.output,
    };
    let progress = ProgressLine::new(&[("pages", jobs.len())]);
    let builds = jobs.into_iter().map(|job| {
        let (ctx, progress) = (&ctx, &progress);
        async move {
            let report = build_page(ctx, job).await;
            progress.inc("pages");
            report
        }
    });
    for report in join_all(builds).await {
        summary.absorb(report);
    }
    progress.finish();

    // Search
    if config.search.enable {
        let out_file = config.search_output();
        let use_cache_exists = config.search.cache && out_file.exists();
        match build_search_json(
            &config.search,
            use_cache_exists,
            &summary.written,
            &config.build.output,
            &out_file,
        )
        .await
        {
            Ok(index) => summary.search = index,
            Err(source) => summary.errors.push(BuildError::Artifact {
                path: out_file,
                source,
            }),
        }
    }

    summary.groups = groups;
    Ok(summary)
}

/// Remove stale output when cleaning, then make sure both directories exist.
fn init_build(config: &SiteConfig) -> Result<()> {
    for dir in [&config.build.output, &config.build.temp] {
        if config.build.clean && dir.exists() {
            fs::remove_dir_all(dir)
                .with_context(|| format!("Failed to clear directory: {}", dir.display()))?;
        }
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
    }
    Ok(())
}

/// Page module sources, sorted by path.
fn collect_page_sources(config: &SiteConfig) -> Vec<PathBuf> {
    collect_all_files(&config.build.pages)
        .into_iter()
        .filter(|path| config.build.is_page_module(path))
        .collect()
}

/// Compiled module paths of one build.
struct CompiledModules {
    pages: Vec<PathBuf>,
    root: Option<PathBuf>,
}

fn compile_modules(
    config: &SiteConfig,
    compiler: &dyn Compiler,
    pages: &[PathBuf],
) -> Result<CompiledModules, BuildError> {
    let build = &config.build;
    let page_options = CompileOptions {
        out_base: build.pages.clone(),
        out_dir: build.temp_pages(),
        alias: build.alias.clone(),
    };
    let compiled_pages = compiler
        .compile(pages, &page_options)
        .map_err(BuildError::Compile)?;

    let root_source = build.root_source();
    let root = if root_source.is_file() {
        let root_options = CompileOptions {
            out_base: build.src.clone(),
            out_dir: build.temp_root(),
            alias: build.alias.clone(),
        };
        compiler
            .compile(&[root_source], &root_options)
            .map_err(BuildError::Compile)?
            .into_iter()
            .next()
    } else {
        None
    };

    Ok(CompiledModules {
        pages: compiled_pages,
        root,
    })
}

/// String phase, persisted and read back, then scan and grouping.
///
/// Metadata files that cannot be written are recorded in `errors`; the
/// in-memory strings and groups are used instead.
fn build_partials(
    config: &SiteConfig,
    compiler: &dyn Compiler,
    loader: &dyn ModuleLoader,
    compiled: &CompiledModules,
    errors: &mut Vec<BuildError>,
) -> Result<(PartialStrings, Vec<HydrateGroup>)> {
    let temp = config.build.temp_partial();
    let entries = collect_partial_entries(&config.build.partials, &config.build);
    let modules = build_partial_modules(&entries, &config.assets.partial);
    if !modules.is_empty() {
        log!("partial"; "found {}", plural_count(modules.len(), "partial"));
    }

    let strings_path = temp.join(STRING_INITIAL);
    let built = build_partial_strings(compiler, &modules).map_err(BuildError::Compile)?;
    let strings = match built
        .save(&strings_path)
        .and_then(|()| PartialStrings::load(&strings_path))
    {
        Ok(strings) => strings,
        Err(source) => {
            errors.push(BuildError::Artifact {
                path: strings_path,
                source,
            });
            built
        }
    };

    let ids: Vec<String> = modules.iter().map(|m| m.id.clone()).collect();
    let root_scan = compiled
        .root
        .as_deref()
        .map(|path| scan_module(loader, path, &ids))
        .transpose()?;
    let page_scans = compiled
        .pages
        .iter()
        .map(|path| scan_module(loader, path, &ids))
        .collect::<Result<Vec<_>>>()?;

    let groups = group_pages(
        root_scan.as_ref(),
        &page_scans,
        &modules,
        &config.assets.partial,
        &config.build.temp_pages(),
    );
    let groups_path = temp.join(HYDRATE_PAGES);
    if let Err(source) = save_groups(&groups, &groups_path) {
        errors.push(BuildError::Artifact {
            path: groups_path,
            source,
        });
    }
    for group in &groups {
        crate::debug!("partial"; "{}: {}", group.name, group.insert_pages.join(", "));
    }
    Ok((strings, groups))
}

/// Log the outcome; any collected error makes the build fail.
fn finish(summary: &BuildSummary) -> Result<()> {
    if summary.drafts > 0 {
        log!("build"; "{} skipped", plural_count(summary.drafts, "draft"));
    }
    if let Some(index) = &summary.search {
        log!("search"; "indexed {}, {}", plural_count(index.pages.len(), "page"), plural_count(index.words.len(), "word"));
    }

    for err in &summary.errors {
        log!("error"; "{}", err.report());
    }
    if !summary.errors.is_empty() {
        bail!("build failed: {}", plural_count(summary.errors.len(), "error"));
    }

    log!("build"; "done, {} written", plural_count(summary.written.len(), "page"));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::StaticCompiler;
    use crate::config::test_site_config;
    use crate::module::FsModuleLoader;
    use crate::utils::sort::upper_cmp;
    use std::cmp::Ordering;
    use std::path::Path;
    use tempfile::TempDir;

    fn write(path: &Path, content: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn site(dir: &Path) -> SiteConfig {
        let config = test_site_config(dir);
        let src = &config.build.src;
        write(
            &src.join("root.html"),
            "<html><head><title>{{ title }}</title></head><body>{{ children }}</body></html>",
        );
        write(&src.join("style.css"), "body { margin: 0; }");
        write(
            &config.build.pages.join("index.html"),
            r#"<main><h1 id="top">Hello islands</h1><div data-partial-hydration="Counter"></div></main>"#,
        );
        write(&config.build.pages.join("posts/[id].html"), "<main><p>{{ body }}</p></main>");
        write(
            &config.build.pages.join("posts/[id].data.json"),
            r#"[
                { "props": { "title": "First", "body": "Rust notes" }, "paths": { "id": "first" } },
                { "props": { "title": "Second", "body": "More notes" }, "paths": { "id": "second" } }
            ]"#,
        );
        write(&config.build.partials.join("Counter.html"), "<button>0</button>");
        write(&config.build.partials.join("Counter.client.js"), "target.dataset.count = 0;");
        config
    }

    fn build(config: &SiteConfig) -> BuildSummary {
        try_build(config, &StaticCompiler).unwrap()
    }

    #[test]
    fn test_build_site_end_to_end() {
        let dir = TempDir::new().unwrap();
        let config = site(dir.path());
        let summary = build(&config);
        let out = &config.build.output;

        assert!(summary.errors.is_empty(), "{:?}", summary.errors);
        assert_eq!(summary.written.len(), 3);
        assert!(out.join("posts/first.html").is_file());
        assert!(out.join("posts/second.html").is_file());
        assert!(!out.join("posts/[id].html").exists());

        let index = fs::read_to_string(out.join("index.html")).unwrap();
        assert!(index.contains(r#"<div data-partial-hydration="ph-1"><button>0</button></div>"#));
        assert!(index.contains(r#"<link rel="stylesheet" href="/assets/bundle.css">"#));
        assert!(index.contains(r#"src="/assets/hydrate-1.js""#));

        let post = fs::read_to_string(out.join("posts/first.html")).unwrap();
        assert!(post.contains("<title>First</title>"));
        assert!(post.contains("<p>Rust notes</p>"));
        assert!(!post.contains("hydrate-1.js"));

        assert_eq!(summary.groups.len(), 1);
        assert_eq!(summary.groups[0].insert_pages, vec!["/"]);
        assert!(config.build.temp_partial().join(STRING_INITIAL).is_file());
        assert!(config.build.temp_partial().join(HYDRATE_PAGES).is_file());

        let search = summary.search.unwrap();
        assert_eq!(search.pages.len(), 3);
        assert!(search.words.iter().any(|w| w == "islands"));
        assert!(config.search_output().is_file());
    }

    #[test]
    fn test_drafts_skipped() {
        let dir = TempDir::new().unwrap();
        let config = site(dir.path());
        write(
            &config.build.pages.join("wip.html"),
            "+++\ndraft = true\n+++\n<main>later</main>",
        );
        let summary = build(&config);
        assert_eq!(summary.drafts, 1);
        assert!(!config.build.output.join("wip.html").exists());
    }

    #[test]
    fn test_page_failure_is_collected() {
        let dir = TempDir::new().unwrap();
        let config = site(dir.path());
        write(&config.build.pages.join("broken.html"), "<main>x</main>");
        write(&config.build.pages.join("broken.data.json"), "{ not json");

        let summary = build(&config);
        assert_eq!(summary.errors.len(), 1);
        assert!(matches!(summary.errors[0], BuildError::StaticData { .. }));
        assert_eq!(summary.written.len(), 3);
        assert!(finish(&summary).is_err());
    }

    #[test]
    fn test_search_cache_reused() {
        let dir = TempDir::new().unwrap();
        let mut config = site(dir.path());
        config.search.cache = true;
        assert!(build(&config).search.is_some());
        assert!(build(&config).search.is_none());
    }

    #[test]
    fn test_clean_removes_stale_output() {
        let dir = TempDir::new().unwrap();
        let mut config = site(dir.path());
        write(&config.build.output.join("stale.html"), "old");
        config.build.clean = true;
        build(&config);
        assert!(!config.build.output.join("stale.html").exists());
    }

    #[test]
    fn test_artifact_failure_keeps_page_errors() {
        let dir = TempDir::new().unwrap();
        let mut config = site(dir.path());
        write(&config.build.pages.join("broken.html"), "<main>x</main>");
        write(&config.build.pages.join("broken.data.json"), "{ not json");
        config.search.output = "index.html/search.json".into();

        let summary = build(&config);
        assert!(config.build.output.join("index.html").is_file());
        assert!(summary.search.is_none());
        assert_eq!(summary.errors.len(), 2);
        assert!(summary.errors.iter().any(|e| matches!(e, BuildError::StaticData { .. })));
        assert!(summary.errors.iter().any(|e| matches!(
            e,
            BuildError::Artifact { path, .. } if path == &config.search_output()
        )));
        assert!(finish(&summary).is_err());
    }

    #[test]
    fn test_partial_metadata_failure_still_renders_partials() {
        let dir = TempDir::new().unwrap();
        let config = site(dir.path());
        write(&config.build.temp_partial(), "not a directory");

        let summary = build(&config);
        assert_eq!(summary.errors.len(), 2);
        assert!(summary.errors.iter().all(|e| matches!(e, BuildError::Artifact { .. })));

        let index = fs::read_to_string(config.build.output.join("index.html")).unwrap();
        assert!(index.contains("<button>0</button>"));
        assert_eq!(summary.written.len(), 3);
    }

    #[test]
    fn test_search_index_is_reproducible() {
        let dir = TempDir::new().unwrap();
        let config = site(dir.path());

        let first = build(&config).search.unwrap();
        let first_bytes = fs::read(config.search_output()).unwrap();
        let second = build(&config).search.unwrap();
        let second_bytes = fs::read(config.search_output()).unwrap();

        assert_eq!(first, second);
        assert_eq!(first_bytes, second_bytes);

        let words = &second.words;
        assert!(words.windows(2).all(|w| upper_cmp(&w[0], &w[1]) == Ordering::Less));
        for page in &second.pages {
            assert!(page.toc.iter().all(|(offset, _)| *offset <= page.content.len()));
            for &i in page.title.iter().chain(&page.content) {
                assert!(i < words.len());
            }
        }
        assert!(second.hits.iter().all(|&i| i < words.len()));
    }

    struct FailingCompiler;

    impl Compiler for FailingCompiler {
        fn compile(&self, _: &[PathBuf], _: &CompileOptions) -> Result<Vec<PathBuf>> {
            bail!("syntax error in index.html")
        }

        fn render_virtual(
            &self,
            _: &crate::compiler::VirtualEntry,
        ) -> Result<std::collections::BTreeMap<String, String>> {
            Ok(Default::default())
        }

        fn bundle_for_client(
            &self,
            _: &crate::compiler::ClientEntry,
            _: &BundleOptions,
        ) -> Result<Vec<crate::compiler::BundleOutput>> {
            Ok(Vec::new())
        }
    }

    fn try_build(config: &SiteConfig, compiler: &dyn Compiler) -> Result<BuildSummary> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        runtime.block_on(build_site(config, compiler, &FsModuleLoader))
    }

    #[test]
    fn test_compile_failure_aborts() {
        let dir = TempDir::new().unwrap();
        let config = site(dir.path());
        let err = try_build(&config, &FailingCompiler).unwrap_err();
        let build_err = err.downcast_ref::<BuildError>().unwrap();
        assert!(matches!(build_err, BuildError::Compile(_)));
        assert!(build_err.report().contains("syntax error"));
        assert!(!config.build.output.join("index.html").exists());
    }

    #[test]
    fn test_root_failure_aborts() {
        let dir = TempDir::new().unwrap();
        let config = site(dir.path());
        write(&config.build.root_source(), "+++\nnot toml = = \n+++\n");
        assert!(try_build(&config, &StaticCompiler).is_err());
    }
}
