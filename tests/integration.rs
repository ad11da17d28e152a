use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn notedex_binary() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("notedex");
    path
}

fn setup_test_env() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let input = tmp.path().join("notes.csv");
    fs::write(
        &input,
        "Title,Description,Page,Book\n\
         Zebra Routing,Stripes across subnets,77,SEC503\n\
         AES,Advanced Encryption Standard,142,SEC401\n\
         aes,Advanced Encryption Standard,142,SEC401\n\
         ,orphan description,3,SEC401\n\
         802.1X,Port-based access control,12,SEC401\n",
    )
    .unwrap();
    (tmp, input)
}

fn run_notedex(args: &[&str]) -> (String, String, bool) {
    let binary = notedex_binary();
    let output = Command::new(&binary)
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("Failed to run notedex binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let success = output.status.success();
    (stdout, stderr, success)
}

fn path_str(path: &Path) -> &str {
    path.to_str().unwrap()
}

#[test]
fn test_generate_to_file() {
    let (tmp, input) = setup_test_env();
    let output = tmp.path().join("index.html");

    let (stdout, stderr, success) = run_notedex(&[path_str(&input), path_str(&output)]);
    assert!(success, "run failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.is_empty());
    assert!(stderr.contains("Success: Generated index with 4 entries"));
    assert!(stderr.contains("index.html"));

    let html = fs::read_to_string(&output).unwrap();
    assert_eq!(html.matches("class=topic").count(), 4);
    assert_eq!(html.matches("class=Title1").count(), 3);
    let a = html.find(">Aa<").unwrap();
    let z = html.find(">Zz<").unwrap();
    let other = html.find("Numbers &amp; Special Characters").unwrap();
    assert!(a < z && z < other);
}

#[test]
fn test_generate_to_stdout() {
    let (_tmp, input) = setup_test_env();

    let (stdout, stderr, success) = run_notedex(&[path_str(&input)]);
    assert!(success, "run failed: stderr={}", stderr);
    assert!(stdout.contains("class=topic"));
    assert!(stdout.contains("{b-SEC401 / p-142}"));
    // Diagnostics never leak into the document.
    assert!(!stdout.contains("Warning:"));
    assert!(!stdout.contains("Success:"));
    assert!(stderr.contains("→ stdout"));
}

#[test]
fn test_warnings_on_stderr() {
    let (_tmp, input) = setup_test_env();

    let (_, stderr, success) = run_notedex(&[path_str(&input)]);
    assert!(success);
    assert!(stderr.contains("Info: Detected comma-delimited input"));
    assert!(stderr.contains("Warning: Skipped 1 row with empty titles"));
    assert!(stderr.contains("Warning: Found 1 duplicate entry:"));
    assert!(stderr.contains("  - 'AES' (Book: SEC401, Page: 142) on rows: 3, 4"));
}

#[test]
fn test_json_diagnostics() {
    let (_tmp, input) = setup_test_env();

    let (_, stderr, success) = run_notedex(&[path_str(&input), "--diagnostics", "json"]);
    assert!(success);
    let events: Vec<serde_json::Value> = stderr
        .lines()
        .map(|l| serde_json::from_str(l).unwrap_or_else(|e| panic!("bad line {:?}: {}", l, e)))
        .collect();
    let names: Vec<&str> = events.iter().map(|e| e["event"].as_str().unwrap()).collect();
    assert_eq!(
        names,
        vec!["delimiter", "empty_titles_skipped", "duplicates", "success"]
    );
    assert_eq!(events[2]["groups"][0]["rows"], serde_json::json!([3, 4]));
    assert_eq!(events[3]["entries"], 4);
}

#[test]
fn test_diagnostics_off() {
    let (_tmp, input) = setup_test_env();

    let (stdout, stderr, success) = run_notedex(&[path_str(&input), "--diagnostics", "off"]);
    assert!(success);
    assert!(stderr.is_empty(), "unexpected stderr: {}", stderr);
    assert!(stdout.contains("class=topic"));
}

#[test]
fn test_missing_input_fails() {
    let tmp = TempDir::new().unwrap();
    let missing = tmp.path().join("nope.csv");

    let (stdout, stderr, success) = run_notedex(&[path_str(&missing)]);
    assert!(!success);
    assert!(stdout.is_empty());
    assert!(stderr.contains("Error:"));
    assert!(stderr.contains("nope.csv"));
}

#[test]
fn test_unsupported_format_fails() {
    let tmp = TempDir::new().unwrap();
    let input = tmp.path().join("notes.docx");
    fs::write(&input, "whatever").unwrap();

    let (_, stderr, success) = run_notedex(&[path_str(&input)]);
    assert!(!success);
    assert!(stderr.contains("Unsupported file format: .docx"));
    assert!(stderr.contains(".xlsx"));
}

#[test]
fn test_missing_columns_message() {
    let tmp = TempDir::new().unwrap();
    let input = tmp.path().join("notes.tsv");
    fs::write(&input, "Titel\tDesc\tPage\tBook\nAES\tcipher\t142\tSEC401\n").unwrap();
    let output = tmp.path().join("index.html");

    let (_, stderr, success) = run_notedex(&[path_str(&input), path_str(&output)]);
    assert!(!success);
    assert!(stderr.contains("Missing required columns: Title, Description"));
    assert!(stderr.contains("Found columns: Titel, Desc, Page, Book"));
    assert!(stderr.contains("Did you mean 'Title'?"));
    assert!(!output.exists());
}

#[test]
fn test_config_file() {
    let (tmp, _) = setup_test_env();
    let input = tmp.path().join("gse.csv");
    fs::write(
        &input,
        "Title,Description,Page,Book,Course\n\
         RSA,Keys,150,SEC401,SEC401\n\
         RSA,Keys,150,SEC401,SEC501\n",
    )
    .unwrap();
    let config = tmp.path().join("notedex.toml");
    fs::write(
        &config,
        "[duplicates]\ninclude_course = true\n\n[output]\nuppercase_titles = false\n",
    )
    .unwrap();

    let (stdout, stderr, success) =
        run_notedex(&[path_str(&input), "--config", path_str(&config)]);
    assert!(success, "run failed: {}", stderr);
    assert!(!stderr.contains("duplicate"));
    assert!(stderr.contains("GSE"));
    assert!(stdout.contains("{c-SEC501 / b-SEC401 / p-150}"));

    // Without the config the two rows collide.
    let (_, stderr, _) = run_notedex(&[path_str(&input)]);
    assert!(stderr.contains("Warning: Found 1 duplicate entry:"));
}

#[test]
fn test_invalid_config_fails() {
    let (tmp, input) = setup_test_env();
    let config = tmp.path().join("bad.toml");
    fs::write(&config, "[validation]\nsuggestion_threshold = 2.0\n").unwrap();

    let (_, stderr, success) = run_notedex(&[path_str(&input), "--config", path_str(&config)]);
    assert!(!success);
    assert!(stderr.contains("suggestion_threshold"));
}
