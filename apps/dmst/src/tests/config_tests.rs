use super::*;

use std::{
    collections::HashMap,
    env,
    time::{SystemTime, UNIX_EPOCH},
};

fn temp_root(tag: &str) -> PathBuf {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let root = env::temp_dir().join(format!("dmst_{tag}_{suffix}"));
    fs::create_dir_all(&root).expect("temp root");
    root
}

fn labels_and_values(pool: &OptionPool) -> Vec<(String, String)> {
    pool.entries()
        .iter()
        .map(|e| (e.label.clone(), e.value.0.clone()))
        .collect()
}

#[test]
fn missing_settings_file_falls_back_to_defaults() {
    let root = temp_root("missing");
    let mut settings = Settings::default();
    apply_env_overrides(&mut settings, |_| None);
    assert!(settings.distinct_options);
    assert_eq!(settings.non_value, NonValue::default());

    let loaded = load_settings(&root.join("absent.toml")).expect("defaults");
    assert_eq!(loaded.option_order, OptionOrder::ByValue);
    fs::remove_dir_all(root).expect("cleanup");
}

#[test]
fn settings_file_overrides_defaults() {
    let root = temp_root("settings");
    let path = root.join("dmst.toml");
    fs::write(
        &path,
        r#"
distinct_options = false
option_order = "by_label"
non_value_placement = "sorted"

[non_value]
label = "Please Choose"
value = "0"
"#,
    )
    .expect("write settings");

    let settings = load_settings(&path).expect("load settings");
    assert!(!settings.distinct_options);
    assert_eq!(settings.option_order, OptionOrder::ByLabel);
    assert_eq!(settings.non_value_placement, NonValuePlacement::Sorted);
    assert_eq!(settings.non_value.label, "Please Choose");
    assert_eq!(settings.non_value.value, OptionValue::from("0"));
    assert_eq!(settings.value_ordering, ValueOrdering::Natural);
    fs::remove_dir_all(root).expect("cleanup");
}

#[test]
fn malformed_settings_file_is_an_error() {
    let root = temp_root("malformed");
    let path = root.join("dmst.toml");
    fs::write(&path, "distinct_options = \"sometimes\"").expect("write settings");
    assert!(load_settings(&path).is_err());
    fs::remove_dir_all(root).expect("cleanup");
}

#[test]
fn unreadable_settings_path_is_an_error() {
    let root = temp_root("unreadable");
    let path = root.join("dmst.toml");
    fs::create_dir_all(&path).expect("directory in place of the file");

    let err = load_settings(&path).expect_err("a directory is not a settings file");
    assert!(err.to_string().contains("failed to read settings file"));
    fs::remove_dir_all(root).expect("cleanup");
}

#[test]
fn app_prefixed_variables_win_over_short_names() {
    let vars: HashMap<&str, &str> = HashMap::from([
        ("DMST_DISTINCT_OPTIONS", "no"),
        ("DMST_NON_VALUE", "x"),
        ("APP__NON_VALUE", "y"),
        ("DMST_POOL", "pool.json"),
        ("DMST_LOG", "debug"),
    ]);
    let mut settings = Settings::default();
    apply_env_overrides(&mut settings, |key| vars.get(key).map(|v| v.to_string()));

    assert!(!settings.distinct_options);
    assert_eq!(settings.non_value.value, OptionValue::from("y"));
    assert_eq!(settings.pool_path, Some(PathBuf::from("pool.json")));
    assert_eq!(settings.log_filter, "debug");
}

#[test]
fn unparseable_flag_is_ignored() {
    let mut settings = Settings::default();
    apply_env_overrides(&mut settings, |key| {
        (key == "DMST_DISTINCT_OPTIONS").then(|| "maybe".to_string())
    });
    assert!(settings.distinct_options);
}

#[test]
fn json_object_pool_keeps_key_order_and_stringifies_numbers() {
    let pool = parse_json_pool(r#"{"Zebra": 3, "Apple": "1", "Mango": 2.5}"#).expect("pool");
    assert_eq!(
        labels_and_values(&pool),
        vec![
            ("Zebra".to_string(), "3".to_string()),
            ("Apple".to_string(), "1".to_string()),
            ("Mango".to_string(), "2.5".to_string()),
        ]
    );
}

#[test]
fn json_array_pool_is_accepted() {
    let pool = parse_json_pool(r#"[{"label": "A", "value": "1"}, {"label": "B", "value": "2"}]"#)
        .expect("pool");
    assert_eq!(pool.len(), 2);
    assert_eq!(pool.label_for(&OptionValue::from("2")), Some("B"));
}

#[test]
fn json_pool_rejects_nested_values() {
    assert!(parse_json_pool(r#"{"A": [1, 2]}"#).is_err());
    assert!(parse_json_pool("42").is_err());
}

#[test]
fn toml_pool_file_is_loaded_by_extension() {
    let root = temp_root("pool");
    let path = root.join("pool.toml");
    fs::write(&path, "Red = 1\nGreen = \"g\"\nBlue = 3\n").expect("write pool");

    let pool = load_pool(&path).expect("load pool");
    assert_eq!(
        labels_and_values(&pool),
        vec![
            ("Red".to_string(), "1".to_string()),
            ("Green".to_string(), "g".to_string()),
            ("Blue".to_string(), "3".to_string()),
        ]
    );
    fs::remove_dir_all(root).expect("cleanup");
}

#[test]
fn missing_pool_file_reports_path() {
    let err = load_pool(Path::new("/definitely/not/here.json")).expect_err("missing file");
    assert!(err.to_string().contains("/definitely/not/here.json"));
}

#[test]
fn settings_translate_to_engine_config() {
    let settings = Settings {
        distinct_options: false,
        ..Settings::default()
    };
    let config = settings.engine_config(OptionPool::new([OptionEntry::new("A", "1")]));
    assert!(!config.distinct_options);
    assert_eq!(config.pool.len(), 1);
    assert_eq!(config.non_value, NonValue::default());
}
