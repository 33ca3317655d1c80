use std::process::{Command, Output};

fn chapelet(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_chapelet"))
        .args(args)
        .env("RUST_LOG", "off")
        .output()
        .expect("failed to run chapelet binary")
}

#[test]
fn layout_prints_a_json_report() {
    let output = chapelet(&["layout", "--total", "33", "--count", "15"]);
    assert!(output.status.success());

    let report: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout is json");
    assert_eq!(report["percentage"], 45);
    assert_eq!(report["markers"], serde_json::json!([10, 21]));
}

#[test]
fn render_writes_svg_to_stdout() {
    let output = chapelet(&["render", "--total", "12", "--count", "4", "--no-ring"]);
    assert!(output.status.success());

    let document = String::from_utf8(output.stdout).expect("utf-8 output");
    assert!(document.starts_with("<svg"));
    assert_eq!(document.matches(r#"class="bead""#).count(), 13);
    assert!(!document.contains(r#"class="progress""#));
}

#[test]
fn missing_style_file_fails() {
    let output = chapelet(&["layout", "--config", "/nonexistent/style.toml"]);

    assert!(!output.status.success());
}

#[test]
fn help_lists_every_subcommand() {
    let output = chapelet(&["--help"]);
    assert!(output.status.success());

    let help = String::from_utf8(output.stdout).expect("utf-8 output");
    for subcommand in ["render", "layout", "preview"] {
        assert!(help.contains(subcommand), "missing {subcommand}");
    }
}

#[test]
fn oversized_total_is_replaced_by_the_canonical_chaplet() {
    let output = chapelet(&["layout", "--total", "4294967295", "--count", "5"]);
    assert!(output.status.success());

    let report: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout is json");
    assert_eq!(report["total_beads"], 33);
    assert_eq!(report["completed_count"], 5);
}
