//! End-to-end scenarios (`spec.md` §8), driven through the library's public
//! `run` entrypoint against real temporary files.

use std::fs;
use std::path::PathBuf;

use pretty_assertions::assert_eq;

use htgrep::cli::{Cli, ColorMode};
use htgrep::logging::{LogLevel, LoggingConfig};
use htgrep::RunContext;

fn temp_path(label: &str) -> PathBuf {
    std::env::temp_dir().join(format!("htgrep-it-{label}-{}", std::process::id()))
}

fn base_cli(pattern: &str) -> Cli {
    Cli {
        case_insensitive: false,
        invert: false,
        list_structure: false,
        output: None,
        pattern_file: None,
        extended_regex: false,
        follow_symlinks: false,
        recurse: false,
        recurse_follow: false,
        fast: false,
        count: false,
        show_index: false,
        color: ColorMode::Auto,
        logging: LoggingConfig { level: LogLevel::Off },
        pattern: Some(pattern.to_string()),
        files: Vec::new(),
    }
}

fn run_scenario(label: &str, pattern: &str, input: &[u8]) -> Vec<u8> {
    let input_path = temp_path(&format!("{label}-input"));
    let output_path = temp_path(&format!("{label}-output"));
    fs::write(&input_path, input).unwrap();

    let mut cli = base_cli(pattern);
    cli.files = vec![input_path.clone()];
    cli.output = Some(output_path.clone());

    let cli = cli.validate().unwrap();
    let ctx = RunContext::new(cli).unwrap();
    htgrep::run(&ctx).unwrap();

    let out = fs::read(&output_path).unwrap();
    fs::remove_file(&input_path).unwrap();
    fs::remove_file(&output_path).unwrap();
    out
}

#[test]
fn void_elements() {
    let out = run_scenario("void-elements", "br", b"<p>x<br>y</p>");
    assert_eq!(out, b"<br>");
}

#[test]
fn attribute_predicate() {
    let out = run_scenario(
        "attribute-predicate",
        "a +href",
        br#"<a href="x">1</a><a>2</a><a href="y">3</a>"#,
    );
    assert_eq!(out, br#"<a href="x">1</a><a href="y">3</a>"#);
}

#[test]
fn nested_position_range() {
    let out = run_scenario(
        "nested-position-range",
        "li[1]",
        b"<ul><li>1</li><li>2</li><li>3</li></ul>",
    );
    assert_eq!(out, b"<li>2</li>");
}

#[test]
fn sequence_descent() {
    let out = run_scenario(
        "sequence-descent",
        "div; span[0]",
        b"<div><span>a</span></div><div><span>b</span></div>",
    );
    assert_eq!(out, b"<span>a</span><span>b</span>");
}

#[test]
fn alternatives_preserve_order() {
    let out = run_scenario("alternatives-order", "b, i", b"<b>1</b><i>2</i><b>3</b>");
    assert_eq!(out, b"<b>1</b><i>2</i><b>3</b>");
}

#[test]
fn opaque_tag() {
    let out = run_scenario(
        "opaque-tag",
        "p",
        b"<script>if (a<b) x=1;</script><p>ok</p>",
    );
    assert_eq!(out, b"<p>ok</p>");
}

#[test]
fn count_flag_reports_match_count_instead_of_emitting() {
    let input_path = temp_path("count-input");
    let output_path = temp_path("count-output");
    fs::write(&input_path, b"<li>1</li><li>2</li><li>3</li>").unwrap();

    let mut cli = base_cli("li");
    cli.files = vec![input_path.clone()];
    cli.output = Some(output_path.clone());
    cli.count = true;

    let ctx = RunContext::new(cli.validate().unwrap()).unwrap();
    htgrep::run(&ctx).unwrap();

    let out = fs::read_to_string(&output_path).unwrap();
    assert_eq!(out.trim(), "3");

    fs::remove_file(&input_path).unwrap();
    fs::remove_file(&output_path).unwrap();
}

#[test]
fn pattern_file_is_an_equivalent_source_to_a_literal_pattern() {
    let input_path = temp_path("patfile-input");
    let pattern_path = temp_path("patfile-pattern");
    let output_path = temp_path("patfile-output");
    fs::write(&input_path, b"<p>x<br>y</p>").unwrap();
    fs::write(&pattern_path, b"br").unwrap();

    let mut cli = base_cli("unused");
    cli.pattern = None;
    cli.pattern_file = Some(pattern_path.clone());
    cli.files = vec![input_path.clone()];
    cli.output = Some(output_path.clone());

    let ctx = RunContext::new(cli.validate().unwrap()).unwrap();
    htgrep::run(&ctx).unwrap();

    assert_eq!(fs::read(&output_path).unwrap(), b"<br>");

    fs::remove_file(&input_path).unwrap();
    fs::remove_file(&pattern_path).unwrap();
    fs::remove_file(&output_path).unwrap();
}

#[test]
fn directory_argument_without_recurse_flag_is_skipped_not_fatal() {
    let dir = temp_path("dir-noflag");
    fs::create_dir_all(&dir).unwrap();
    let output_path = temp_path("dir-noflag-output");

    let mut cli = base_cli("p");
    cli.files = vec![dir.clone()];
    cli.output = Some(output_path.clone());

    let ctx = RunContext::new(cli.validate().unwrap()).unwrap();
    assert!(htgrep::run(&ctx).is_ok());

    fs::remove_dir_all(&dir).unwrap();
    let _ = fs::remove_file(&output_path);
}
