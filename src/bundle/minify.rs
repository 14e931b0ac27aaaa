//! Minification for pages, scripts and stylesheets.
//!
//! Uses oxc for JavaScript and lightningcss for CSS. Parse failures are
//! returned as messages so the bundler can attribute them to an entry.

use std::path::Path;

use lightningcss::stylesheet::{ParserOptions, PrinterOptions, StyleSheet};
use oxc::allocator::Allocator;
use oxc::codegen::{Codegen, CodegenOptions, CommentOptions};
use oxc::mangler::MangleOptions;
use oxc::minifier::{CompressOptions, Minifier, MinifierOptions};
use oxc::parser::Parser;
use oxc::span::SourceType;

/// Minify JavaScript source code.
///
/// `module` selects ES module parsing; classic scripts keep their
/// top-level bindings global.
pub fn minify_js(source: &str, module: bool) -> Result<String, String> {
    let allocator = Allocator::default();
    let source_type = if module {
        SourceType::mjs()
    } else {
        SourceType::cjs()
    };
    let ret = Parser::new(&allocator, source, source_type).parse();
    if let Some(err) = ret.errors.first() {
        return Err(format!("JavaScript parse error: {err}"));
    }
    let mut program = ret.program;
    let options = MinifierOptions {
        mangle: Some(MangleOptions::default()),
        compress: Some(CompressOptions::smallest()),
    };
    let ret = Minifier::new(options).minify(&allocator, &mut program);
    let code = Codegen::new()
        .with_options(CodegenOptions {
            minify: true,
            comments: CommentOptions::disabled(),
            ..CodegenOptions::default()
        })
        .with_scoping(ret.scoping)
        .build(&program)
        .code;
    Ok(code)
}

/// Minify CSS source code.
pub fn minify_css(source: &str) -> Result<String, String> {
    let stylesheet = StyleSheet::parse(source, ParserOptions::default())
        .map_err(|e| format!("CSS parse error: {e}"))?;
    let result = stylesheet
        .to_css(PrinterOptions {
            minify: true,
            ..PrinterOptions::default()
        })
        .map_err(|e| format!("CSS print error: {e}"))?;
    Ok(result.code)
}

/// Minify a chunk based on its file extension.
///
/// Unknown extensions pass through unchanged.
pub fn minify_by_ext(path: &Path, content: &str, module: bool) -> Result<String, String> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("js" | "mjs") => minify_js(content, module),
        Some("css") => minify_css(content),
        _ => Ok(content.to_string()),
    }
}
