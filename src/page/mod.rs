//! Page generation: route resolution, rendering, writing.
//!
//! One [`PageJob`] per compiled page module. [`build_page`] resolves the
//! module's routes, renders each route and writes all of them concurrently.
//! Failures are collected into the [`PageReport`] instead of aborting
//! sibling routes or pages.

pub mod render;
pub mod route;
mod write;

pub use render::{RenderContext, render_page};
pub use route::resolve_routes;
pub use write::write_page;

use crate::error::BuildError;
use crate::module::PageModule;
use crate::utils::path::fs::rebase;
use futures::future::join_all;
use std::path::{Path, PathBuf};

/// A loaded page module and where it renders to.
#[derive(Debug, Clone)]
pub struct PageJob {
    /// Module path, used in error reports.
    pub source: PathBuf,
    pub module: PageModule,
    /// Output path, possibly with `[name]` route tokens.
    pub out_file: PathBuf,
}

/// Outcome of building one page module.
#[derive(Debug, Default)]
pub struct PageReport {
    pub written: Vec<PathBuf>,
    pub drafts: usize,
    pub errors: Vec<BuildError>,
}

/// Output path of a module at `module` under `modules_dir`.
///
/// `pages/blog/[slug].htm` -> `dist/blog/[slug].html`
pub fn out_file_for(module: &Path, modules_dir: &Path, output: &Path) -> PathBuf {
    rebase(module, modules_dir, output).with_extension("html")
}

/// Resolve, render and write every route of one page module.
pub async fn build_page(ctx: &RenderContext<'_>, job: PageJob) -> PageReport {
    let mut report = PageReport::default();

    let routes = match resolve_routes(&job.module, job.out_file).await {
        Ok(routes) => routes,
        Err(source) => {
            report.errors.push(BuildError::StaticData {
                page: job.source,
                source,
            });
            return report;
        }
    };

    let mut rendered = Vec::with_capacity(routes.len());
    for route in routes {
        match render_page(ctx, &job.module, &route.item, &route.out_file) {
            Ok(Some(html)) => rendered.push((route.out_file, html)),
            Ok(None) => report.drafts += 1,
            Err(source) => report.errors.push(BuildError::Render {
                page: route.out_file,
                source,
            }),
        }
    }

    let writes = rendered.iter().map(|(out_file, html)| write_page(out_file, html));
    for (result, (out_file, _)) in join_all(writes).await.into_iter().zip(&rendered) {
        match result {
            Ok(()) => report.written.push(out_file.clone()),
            Err(err) => report.errors.push(err),
        }
    }
    report
}
