use std::path::Path;
use std::process::{Command, Output};

fn colorvar(dir: &Path, args: &[&str]) -> Output {
    return Command::new(env!("CARGO_BIN_EXE_colorvar")).current_dir(dir).args(args).output().unwrap();
}

fn read(dir: &Path, name: &str) -> String {
    return std::fs::read_to_string(dir.join(name)).unwrap();
}

fn stdout(output: &Output) -> String {
    return String::from_utf8_lossy(&output.stdout).into_owned();
}

fn write(dir: &Path, name: &str, content: &str) {
    std::fs::write(dir.join(name), content).unwrap();
}

#[test]
fn rewrites_matching_colors_in_place() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "a.less", "@red: #f00;\na { color: #FF0000; border: 1px solid rgb(255, 0, 0); }\n");

    let output = colorvar(dir.path(), &["a.less"]);
    assert_eq!(output.status.code(), Some(0), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(read(dir.path(), "a.less"), "@red: #f00;\na { color: @red; border: 1px solid @red; }\n");
    assert!(stdout(&output).contains("1 files checked, 1 changed, 0 failed, 0 unmatched colors"));
}

#[test]
fn second_run_changes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "a.less", "@red: #f00;\na { color: #f00; }\n");

    let first = colorvar(dir.path(), &["a.less"]);
    assert_eq!(first.status.code(), Some(0));
    let converted = read(dir.path(), "a.less");

    let second = colorvar(dir.path(), &["a.less"]);
    assert_eq!(second.status.code(), Some(0));
    assert_eq!(read(dir.path(), "a.less"), converted);
    assert!(stdout(&second).contains("1 files checked, 0 changed, 0 failed, 0 unmatched colors"));
}

#[test]
fn unmatched_color_is_reported_with_position() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "a.less", "a { color: #0f0; }\n");

    let output = colorvar(dir.path(), &["a.less"]);
    assert_eq!(output.status.code(), Some(1));
    let text = stdout(&output);
    assert!(text.contains("1. \"a.less\", errors =>"), "stdout: {text}");
    assert!(text.contains("`#0f0` in `color` has no matching theme variable, line: 1, column: 12"));
    assert!(text.contains("Undeclared variable colors:\n// a.less\n#0f0\n"));
    assert_eq!(read(dir.path(), "a.less"), "a { color: #0f0; }\n");
}

#[test]
fn failing_file_does_not_stop_the_batch() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "a.less", "@red: #f00;\na { color: #f00; }\n");
    write(dir.path(), "b.less", "a { color: red; }\n}\n");
    write(dir.path(), "c.less", "@blue: #00f;\nc { color: #0000ff; }\n");

    let output = colorvar(dir.path(), &["--modules", "*.less", "--jobs", "2"]);
    assert_eq!(output.status.code(), Some(2));
    assert_eq!(read(dir.path(), "a.less"), "@red: #f00;\na { color: @red; }\n");
    assert_eq!(read(dir.path(), "b.less"), "a { color: red; }\n}\n");
    assert_eq!(read(dir.path(), "c.less"), "@blue: #00f;\nc { color: @blue; }\n");

    let text = stdout(&output);
    assert!(text.contains("Failed files:\n- b.less: parse failed:"), "stdout: {text}");
    assert!(text.contains("3 files checked, 2 changed, 1 failed, 0 unmatched colors"));
}

#[test]
fn check_mode_reports_without_writing() {
    let dir = tempfile::tempdir().unwrap();
    let source = "@red: #f00;\na { color: #f00; background: #abcdef; }\n";
    write(dir.path(), "a.less", source);

    let output = colorvar(dir.path(), &["-c", "1", "a.less"]);
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(read(dir.path(), "a.less"), source);
    assert!(stdout(&output).contains("`#abcdef` in `background`"));
}

#[test]
fn auto_complete_appends_to_the_variable_file() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "theme.less", "@red: #f00;\n");
    write(dir.path(), "a.less", "a { color: #0f0; background: #f00; }\n");

    let output = colorvar(dir.path(), &["-c", "1", "--auto-complete", "--variables", "theme.less", "a.less"]);
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(read(dir.path(), "theme.less"), "@red: #f00;\n\n// a.less\n@theme-color0: #0f0;\n");
    assert_eq!(read(dir.path(), "a.less"), "a { color: #0f0; background: #f00; }\n");
}

#[test]
fn config_file_supplies_defaults() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), ".colorvarrc", r#"{"syntax": "scss", "checkMode": "1"}"#);
    let source = "$red: #f00;\na { color: #f00; }\n";
    write(dir.path(), "a.scss", source);

    let output = colorvar(dir.path(), &["a.scss"]);
    assert_eq!(output.status.code(), Some(0), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(read(dir.path(), "a.scss"), source);

    let output = colorvar(dir.path(), &["-c", "0", "a.scss"]);
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(read(dir.path(), "a.scss"), "$red: #f00;\na { color: $red; }\n");
}

#[test]
fn json_report_is_machine_readable() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "a.less", "a {\n  color: #0f0;\n}\n");

    let output = colorvar(dir.path(), &["--format", "json", "a.less"]);
    assert_eq!(output.status.code(), Some(1));
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let diagnostic = &report["files"][0]["diagnostics"][0];
    assert_eq!(diagnostic["literal"], "#0f0");
    assert_eq!(diagnostic["color"], "#00ff00");
    assert_eq!(diagnostic["line"], 2);
    assert_eq!(diagnostic["column"], 10);
    assert_eq!(report["undeclared"][0]["literals"][0], "#0f0");
}

#[test]
fn unsupported_syntax_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "a.styl", "a\n  color red\n");

    let output = colorvar(dir.path(), &["--syntax", "stylus", "a.styl"]);
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Unsupported Syntax"), "stderr: {stderr}");
    assert!(stderr.contains("`scss`"));
}

#[test]
fn missing_input_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let output = colorvar(dir.path(), &["missing.less"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Input Not Found"));
}

#[test]
fn dialect_sugar_is_parsed_and_walked() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "a.less",
        "@red: #f00;\n.btn when (@mode = dark) { &-primary { @c: #ff0000; --accent: #f00; width: ~\"calc(100% - @{w})\"; } }\n",
    );
    write(dir.path(), "a.scss", "$red: #f00;\n.btn { &__icon { --accent: #f00; } font: { family: serif; color: #0f0; } }\n");

    let output = colorvar(dir.path(), &["a.less"]);
    assert_eq!(output.status.code(), Some(0), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(
        read(dir.path(), "a.less"),
        "@red: #f00;\n.btn when (@mode = dark) { &-primary { @c: @red; --accent: @red; width: ~\"calc(100% - @{w})\"; } }\n"
    );

    let output = colorvar(dir.path(), &["--syntax", "scss", "a.scss"]);
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(
        read(dir.path(), "a.scss"),
        "$red: #f00;\n.btn { &__icon { --accent: #{$red}; } font: { family: serif; color: #0f0; } }\n"
    );
    assert!(stdout(&output).contains("`#0f0` in `color` has no matching theme variable, line: 2"));
}
