use super::*;

use std::{
    env,
    time::{SystemTime, UNIX_EPOCH},
};

fn script_file(contents: &str) -> PathBuf {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let path = env::temp_dir().join(format!("dmst_script_{suffix}.jsonl"));
    fs::write(&path, contents).expect("write script");
    path
}

fn responses(output: &[u8]) -> Vec<WidgetResponse> {
    String::from_utf8_lossy(output)
        .lines()
        .map(|line| serde_json::from_str(line).expect("response line"))
        .collect()
}

#[test]
fn script_requests_produce_one_response_per_line() {
    let path = script_file(
        r#"
# build a selection, then read it back
{"type":"select","payload":{"position":0,"value":"2"}}
{"type":"select","payload":{"position":1,"value":"1"}}
{"type":"get_selected"}
not json
{"type":"select","payload":{"position":7,"value":"1"}}
"#,
    );
    let engine = new_engine(&Settings::default(), demo_pool());
    let mut out = Vec::new();
    run_script(engine, &path, true, &mut out).expect("script runs");
    fs::remove_file(path).expect("cleanup");

    let responses = responses(&out);
    assert_eq!(responses.len(), 5);
    assert_eq!(
        responses[0],
        WidgetResponse::Changed {
            appended: true,
            removed: 0,
            control_count: 2,
        }
    );
    assert_eq!(
        responses[2],
        WidgetResponse::Selected {
            values: vec!["2".into(), "1".into()],
        }
    );
    assert!(matches!(
        &responses[3],
        WidgetResponse::Error(ApiError { code: ErrorCode::Validation, .. })
    ));
    assert!(matches!(
        &responses[4],
        WidgetResponse::Error(ApiError { code: ErrorCode::NotFound, .. })
    ));
}

#[test]
fn missing_script_is_an_error() {
    let engine = new_engine(&Settings::default(), demo_pool());
    let mut out = Vec::new();
    let err = run_script(engine, Path::new("/no/such/script.jsonl"), false, &mut out)
        .expect_err("missing script");
    assert!(err.to_string().contains("failed to read script"));
}

#[test]
fn demo_walkthrough_settles_with_verification() {
    run_demo(&Settings::default(), true).expect("demo runs");
}

#[test]
fn dispatch_reports_invariant_breakage_as_internal() {
    let mut engine = new_engine(&Settings::default(), demo_pool());
    let control = engine.controls()[0];
    engine.host_mut().remove_control(&control);
    let err = dispatch(&mut engine, WidgetRequest::GetSelected, true).expect_err("host diverged");
    assert_eq!(err.code, ErrorCode::Internal);
}
