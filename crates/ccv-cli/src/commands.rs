use std::path::Path;

use anyhow::{Context, Result};
use tracing::{info, info_span};

use ccv_cli::{CcvConfig, IngestReport, Session};
use ccv_ingest::resolve_heading;
use ccv_transform::{TemplateOptions, template};

use crate::cli::{BuildArgs, ExportArgs, SectionsArgs, TemplateArgs};
use crate::summary::print_sections;

pub fn run_sections(config: &CcvConfig, args: &SectionsArgs) -> Result<()> {
    let schema = config.load_schema()?;
    print_sections(&schema, args.all);
    Ok(())
}

pub fn run_template(config: &CcvConfig, args: &TemplateArgs) -> Result<()> {
    let schema = config.load_schema()?;
    let section = resolve_heading(&schema, &args.section)?;
    let mut options = TemplateOptions {
        use_ids: args.ids,
        ..TemplateOptions::default()
    };
    if args.bare {
        options.descriptions = false;
        options.types = false;
        options.constraints = false;
    }
    let text = template(&schema, section).render_yaml(&options);
    write_output(args.output.as_deref(), &text)
}

/// Returns the report; the caller decides the exit code from rejections.
pub fn run_build(config: &CcvConfig, args: &BuildArgs) -> Result<IngestReport> {
    let span = info_span!("build", input = %args.input.display());
    let _guard = span.enter();
    let schema = config.load_schema()?;
    let codec = config.codec();
    let mut session = match &args.cv {
        Some(path) => Session::open(schema, codec, path)?,
        None => Session::new(schema, codec),
    };

    let report = session.ingest_dir(&args.input, args.pattern.as_deref())?;

    if let Some(path) = &args.report {
        let json = serde_json::to_string_pretty(&report).context("serialize ingest report")?;
        std::fs::write(path, json).with_context(|| format!("write report {}", path.display()))?;
        info!(path = %path.display(), "wrote ingest report");
    }
    if args.dry_run {
        info!("dry run, document not written");
    } else {
        session.export(&args.output)?;
    }
    Ok(report)
}

pub fn run_export(config: &CcvConfig, args: &ExportArgs) -> Result<()> {
    let schema = config.load_schema()?;
    let session = Session::open(schema, config.codec(), &args.cv)?;
    let documents = args
        .sections
        .iter()
        .map(|key| session.export_section(key).with_context(|| format!("export {key}")))
        .collect::<Result<Vec<_>>>()?;
    write_output(args.output.as_deref(), &documents.join("---\n"))
}

fn write_output(path: Option<&Path>, text: &str) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, text).with_context(|| format!("write {}", path.display()))?;
            info!(path = %path.display(), "written");
        }
        None => print!("{text}"),
    }
    Ok(())
}
