use clickflat::{
    flatten_file, flatten_json, flatten_with, AbsenceRule, FlattenConfig, FlattenError, Flattener,
    ParserBackend, SCHEMA,
};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::io::{self, BufReader, Read, Write};

fn run(input: &str) -> (Value, clickflat::FlattenReport) {
    run_with_config(input, &FlattenConfig::default())
}

fn run_with_config(input: &str, config: &FlattenConfig) -> (Value, clickflat::FlattenReport) {
    let mut output = Vec::new();
    let report = flatten_json(input.as_bytes(), &mut output, config).unwrap();
    let parsed = serde_json::from_slice(&output).expect("output must always be valid JSON");
    (parsed, report)
}

fn rows(value: &Value) -> &Vec<Value> {
    value.as_array().expect("output must be a JSON array")
}

#[test]
fn empty_array_produces_empty_array() {
    let mut output = Vec::new();
    let report = flatten_json(&b"[]"[..], &mut output, &FlattenConfig::default()).unwrap();

    assert_eq!(output, b"[]");
    assert_eq!(report.records, 0);
    assert!(report.is_complete());
}

#[test]
fn records_keep_input_order() {
    let input: Vec<Value> = (0..50).map(|i| json!({"tag": format!("t{i}"), "sessionId": i + 1})).collect();
    let (output, report) = run(&serde_json::to_string(&input).unwrap());

    assert_eq!(report.records, 50);
    let rows = rows(&output);
    assert_eq!(rows.len(), 50);
    for (i, row) in rows.iter().enumerate() {
        assert_eq!(row["tag"], json!(format!("t{i}")));
        assert_eq!(row["sessionId"], json!(i + 1));
    }
}

#[test]
fn single_object_becomes_one_row() {
    let (output, report) = run(r#"{"tag":"x"}"#);

    assert_eq!(report.records, 1);
    let rows = rows(&output);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["tag"], json!("x"));
    assert_eq!(rows[0]["type"], json!("INFO"));
}

#[test]
fn explicit_false_validity_is_kept() {
    let (output, _) = run(r#"[{"valid": false}, {"valid": null}, {}]"#);
    let rows = rows(&output);

    assert_eq!(rows[0]["valid"], json!(false));
    assert_eq!(rows[1]["valid"], json!(true));
    assert_eq!(rows[2]["valid"], json!(true));
}

#[test]
fn nested_selinux_mode_is_flattened() {
    let (output, _) = run(r#"{"deviceState":{"selinuxProperties":{"selinuxMode":"enforcing"}}}"#);
    let row = &rows(&output)[0];

    assert_eq!(row["deviceState_selinuxProperties_selinuxMode"], json!("enforcing"));
    assert_eq!(row["deviceState_selinuxProperties_bootSelinuxProperty"], Value::Null);
    assert_eq!(row["deviceState_selinuxProperties_buildSelinuxProperty"], Value::Null);
    assert_eq!(row["deviceState_selinuxProperties_selinuxEnabledReflect"], Value::Null);
    assert_eq!(row["deviceState_selinuxProperties_selinuxEnforcedReflect"], Value::Null);
    assert_eq!(row["deviceState_selinuxProperties_selinuxEnforcementFileContent"], Value::Null);
}

#[test]
fn broken_second_element_keeps_first() {
    let (output, report) = run(r#"[{"tag":"first"},{"tag":"sec"#);

    assert_eq!(report.records, 1);
    let err = report.parse_error.expect("parse error must be reported");
    assert_eq!(err.record, 1);

    let rows = rows(&output);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["tag"], json!("first"));
}

#[test]
fn every_row_has_every_column_in_schema_order() {
    let (output, _) = run(r#"[{"tag":"a"},{"geolocation":{"city":"Oslo"}}]"#);
    let expected: Vec<&str> = SCHEMA.iter().map(|e| e.output_name).collect();

    for row in rows(&output) {
        assert_eq!(row.as_object().unwrap().len(), SCHEMA.len());
    }

    // Key order on the wire follows the schema, independent of map ordering
    let mut raw = Vec::new();
    flatten_json(&br#"{"tag":"a"}"#[..], &mut raw, &FlattenConfig::default()).unwrap();
    let text = String::from_utf8(raw).unwrap();
    let positions: Vec<usize> = expected
        .iter()
        .map(|name| text.find(&format!("\"{name}\":")).unwrap())
        .collect();
    assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));
}

#[test]
fn falsy_values_flatten_to_null_by_default() {
    let (output, _) = run(r#"{"tag":"","checks":{"debug":{"timeMs":0,"status":"OK"}},"deviceState":{"isAdbEnabled":false}}"#);
    let row = &rows(&output)[0];

    assert_eq!(row["tag"], Value::Null);
    assert_eq!(row["checks_debug_timeMs"], Value::Null);
    assert_eq!(row["checks_debug_status"], json!("OK"));
    assert_eq!(row["deviceState_isAdbEnabled"], Value::Null);
}

#[test]
fn strict_presence_keeps_falsy_values() {
    let config = FlattenConfig {
        absence: AbsenceRule::Presence,
        ..FlattenConfig::default()
    };
    let (output, _) = run_with_config(r#"{"tag":"","checks":{"debug":{"timeMs":0}},"deviceState":{"isAdbEnabled":false}}"#, &config);
    let row = &rows(&output)[0];

    assert_eq!(row["tag"], json!(""));
    assert_eq!(row["checks_debug_timeMs"], json!(0));
    assert_eq!(row["deviceState_isAdbEnabled"], json!(false));
}

#[test]
fn missing_timestamp_gets_current_time() {
    let before = chrono::Utc::now();
    let (output, _) = run(r#"[{"@timestamp":"2023-07-01T08:00:00.000Z"},{}]"#);
    let rows = rows(&output);

    assert_eq!(rows[0]["timestamp"], json!("2023-07-01T08:00:00.000Z"));

    let generated = rows[1]["timestamp"].as_str().unwrap();
    assert!(generated.ends_with('Z'));
    let parsed = chrono::DateTime::parse_from_rfc3339(generated).unwrap();
    assert!(parsed.timestamp_millis() >= before.timestamp_millis());
}

#[test]
fn simd_backend_matches_serde_backend() {
    let input = r#"[{"tag":"a","geolocation":{"latitude":1.5,"ip":"10.0.0.1"},"accessibilityApps":["x"]},{"type":"WARN"}]"#;
    let config = FlattenConfig {
        parser: ParserBackend::Simd,
        ..FlattenConfig::default()
    };

    let mut serde_out = Vec::new();
    let mut simd_out = Vec::new();
    let clock = || chrono::DateTime::from_timestamp(0, 0).unwrap();
    let flattener = Flattener::builtin(AbsenceRule::Falsy).unwrap().with_clock(clock);

    flatten_with(&flattener, input.as_bytes(), &mut serde_out, &FlattenConfig::default()).unwrap();
    flatten_with(&flattener, input.as_bytes(), &mut simd_out, &config).unwrap();

    let serde_rows: Value = serde_json::from_slice(&serde_out).unwrap();
    let simd_rows: Value = serde_json::from_slice(&simd_out).unwrap();
    assert_eq!(serde_rows, simd_rows);
}

#[test]
fn whitespace_only_input_is_a_parse_error() {
    let (output, report) = run("  \n ");
    assert_eq!(output, json!([]));
    assert_eq!(report.records, 0);
    assert!(report.parse_error.is_some());
}

#[test]
fn oversized_record_stops_the_run() {
    let config = FlattenConfig {
        max_record_bytes: Some(32),
        ..FlattenConfig::default()
    };
    let big = "x".repeat(64);
    let (output, report) = run_with_config(&format!(r#"[{{"tag":"ok"}},{{"tag":"{big}"}},{{"tag":"never"}}]"#), &config);

    assert_eq!(rows(&output).len(), 1);
    assert_eq!(report.records, 1);
    assert!(report.parse_error.unwrap().message.contains("exceeds 32 bytes"));
}

struct FailingReader {
    data: &'static [u8],
    served: bool,
}

impl Read for FailingReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.served {
            return Err(io::Error::new(io::ErrorKind::Other, "disk went away"));
        }
        self.served = true;
        let n = self.data.len().min(buf.len());
        buf[..n].copy_from_slice(&self.data[..n]);
        Ok(n)
    }
}

#[test]
fn read_failure_is_returned_and_output_closed() {
    let reader = BufReader::new(FailingReader {
        data: br#"[{"tag":"a"},"#,
        served: false,
    });
    let mut output = Vec::new();

    let err = flatten_json(reader, &mut output, &FlattenConfig::default()).unwrap_err();
    assert!(matches!(err, FlattenError::Io(_)));

    let parsed: Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(parsed.as_array().unwrap().len(), 1);
}

struct FullSink {
    capacity: usize,
    written: usize,
}

impl Write for FullSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.written + buf.len() > self.capacity {
            return Err(io::Error::new(io::ErrorKind::Other, "no space left"));
        }
        self.written += buf.len();
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn write_failure_is_returned() {
    let sink = FullSink { capacity: 64, written: 0 };
    let err = flatten_json(&br#"[{"tag":"a"},{"tag":"b"}]"#[..], sink, &FlattenConfig::default())
        .unwrap_err();

    assert!(matches!(err, FlattenError::Io(_)));
}

#[test]
fn unopenable_sink_is_returned() {
    let sink = FullSink { capacity: 0, written: 0 };
    let err = flatten_json(&b"[]"[..], sink, &FlattenConfig::default()).unwrap_err();

    assert!(matches!(err, FlattenError::Io(_)));
}

#[test]
fn flatten_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("a.json");
    let output = dir.path().join("flattened_output.json");
    std::fs::write(&input, r#"[{"tag":"one"},{"tag":"two","type":"DEBUG"}]"#).unwrap();

    let report = flatten_file(&input, &output, &FlattenConfig::default()).unwrap();
    assert_eq!(report.records, 2);

    let parsed: Value = serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
    let rows = rows(&parsed);
    assert_eq!(rows[0]["type"], json!("INFO"));
    assert_eq!(rows[1]["type"], json!("DEBUG"));
}

#[test]
fn flatten_file_missing_input() {
    let dir = tempfile::tempdir().unwrap();
    let err = flatten_file(
        &dir.path().join("missing.json"),
        &dir.path().join("out.json"),
        &FlattenConfig::default(),
    )
    .unwrap_err();

    assert!(matches!(err, FlattenError::Open { .. }));
}
