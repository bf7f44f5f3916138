//! Rendered-output shape of lexer, parser, and runtime errors.

use sansscript::hooks::ScriptedHost;
use sansscript::runtime::Runtime;

fn render_error(source: &str) -> String {
    colored::control::set_override(false);
    let rendered = Runtime::new(Box::new(ScriptedHost::new()))
        .run(source, "test.sans")
        .expect_err("script should fail")
        .to_string();
    colored::control::unset_override();
    rendered
}

#[test]
fn illegal_character_rendering() {
    let rendered = render_error("charah x = @");

    assert!(rendered.contains("avaidh charitra:'@'"));
    assert!(rendered.contains("sanchikaa <test.sans>, pankti 1"));
    assert!(rendered.contains("charah x = @"));
    assert!(rendered.contains('^'));
}

#[test]
fn lex_error_reports_correct_line() {
    let rendered = render_error("charah x = 1\ncharah y = @");
    assert!(rendered.contains("pankti 2"));
}

#[test]
fn invalid_syntax_rendering() {
    let rendered = render_error("charah = 5");

    assert!(rendered.contains("avaidh vakyavinyasyah"));
    assert!(rendered.contains("apekchhit parichayakah"));
}

#[test]
fn missing_anta_is_reported() {
    let rendered = render_error("sopanah 1:\n1\n");
    assert!(rendered.contains("apekchhit 'anta'"));
}

#[test]
fn deepest_diagnostic_wins() {
    // the failure is inside the call arguments, not at the statement level
    let rendered = render_error("mudrayati(1 + )");
    assert!(rendered.contains("avaidh vakyavinyasyah"));
    assert!(rendered.contains("apekchhit"));
}

#[test]
fn runtime_error_has_traceback_header() {
    let rendered = render_error("10 / 0");

    assert!(rendered.contains("anusandhanam kurvantu"));
    assert!(rendered.contains("<karyakram>"));
    assert!(rendered.contains("runtime trutih"));
    assert!(rendered.contains("shunyen vibhagah"));
}

#[test]
fn traceback_lists_nested_frames() {
    // inner is defined inside outer, so its frame chain runs program →
    // outer → inner
    let source = "niyoga outer():\nniyoga inner(): 1 / 0\npratyavartanam inner()\nanta\nouter()";
    let rendered = render_error(source);

    assert!(rendered.contains("<karyakram>"));
    assert!(rendered.contains("outer"));
    assert!(rendered.contains("inner"));

    // outermost frame first
    let program = rendered.find("<karyakram>").unwrap_or(usize::MAX);
    let outer = rendered.find(", outer").unwrap_or(0);
    let inner = rendered.find(", inner").unwrap_or(0);
    assert!(program < outer && outer < inner);
}

#[test]
fn runtime_error_excerpt_underlines_source() {
    let rendered = render_error("charah big = 10 / 0");
    assert!(rendered.contains("charah big = 10 / 0"));
    assert!(rendered.contains('^'));
}

#[test]
fn undefined_variable_blames_access_site() {
    let rendered = render_error("charah x = 1\nkimapi");

    assert!(rendered.contains("'kimapi' na vivakshitam"));
    assert!(rendered.contains("pankti 2"));
}

#[test]
fn error_inside_function_call_site_in_trace() {
    let source = "niyoga f(x): x / 0\nf(1)";
    let rendered = render_error(source);

    assert!(rendered.contains("shunyen vibhagah"));
    assert!(rendered.contains(", f"));
}
