//! End-to-end tests: model files on disk through analysis and findings.

use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use convcheck::cli::{collect_model_files, load_compilation, run_check, CheckArgs, EXIT_FAILED, EXIT_SUCCESS};
use convcheck::config::{self, Config};
use convcheck::conventions::{
    AnalysisResult, Analyzer, AnalyzerOptions, DiagnosticKind, Severity, SymbolCache,
};
use convcheck::model::Compilation;
use convcheck::report;
use convcheck::summary::{summarize, FailOn};
use tempfile::TempDir;

fn testdata_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("testdata")
}

fn load_pet_store() -> Compilation {
    let files = collect_model_files(&testdata_path().join("model"), &Config::default())
        .expect("should collect model files");
    assert_eq!(files.len(), 3);
    load_compilation(&files).expect("should load model")
}

fn analyze(compilation: &Compilation, config: &Config) -> AnalysisResult {
    let options = config.analyzer_options(compilation).expect("config should resolve");
    Analyzer::new(compilation).options(options).run()
}

/// (file, line, rule id, status code) of every diagnostic.
fn summary_of(result: &AnalysisResult) -> Vec<(String, usize, &'static str, Option<i32>)> {
    result
        .diagnostics
        .iter()
        .map(|d| (d.location.file.clone(), d.location.line, d.kind.id(), d.status_code))
        .collect()
}

#[test]
fn test_pet_store_with_defaults() {
    let compilation = load_pet_store();
    let result = analyze(&compilation, &Config::default());

    assert_eq!(
        summary_of(&result),
        vec![
            ("PetsController.cs".to_string(), 28, "API1001", Some(400)),
            ("PetsController.cs".to_string(), 43, "API1001", Some(409)),
            ("PetsController.cs".to_string(), 55, "API1002", None),
            ("PetsController.cs".to_string(), 66, "API1001", Some(204)),
            ("PlainController.cs".to_string(), 10, "API1002", None),
        ]
    );
    assert_eq!(result.methods_analyzed, 7);
    assert_eq!(result.return_statements, 15);
    assert_eq!(result.methods_analyzed + result.methods_skipped, compilation.method_count());
    assert!(!result.cancelled);
    assert!(result.missing_symbols.is_empty());
}

#[test]
fn test_pet_store_with_lenient_config() {
    let compilation = load_pet_store();
    let config = Config::parse_file(testdata_path().join("lenient.yaml")).expect("should parse config");
    config::validate(&config).expect("config should be valid");

    let result = analyze(&compilation, &config);
    let codes: Vec<_> = result.diagnostics.iter().map(|d| d.status_code).collect();
    assert_eq!(codes, vec![Some(400), Some(409), Some(204)]);

    let findings = report::findings(&compilation, &result.diagnostics, &config);
    assert!(findings.iter().all(|f| f.severity == Severity::Error));
    assert_eq!(
        findings[0].method.as_deref(),
        Some("PetsController.GetPet")
    );
    assert_eq!(findings[0].payload_type, "BadRequestResult");

    let summary = summarize(&result, &findings, FailOn::Error);
    assert!(!summary.passed);
    assert_eq!(summary.errors, 3);
}

#[test]
fn test_lifting_api_controller_requirement() {
    let compilation = load_pet_store();
    let config = Config {
        require_api_controller: Some(false),
        ..Default::default()
    };
    let result = analyze(&compilation, &config);

    // AdminController and the unwrap fixture methods are now analyzed too.
    assert!(result
        .diagnostics
        .iter()
        .any(|d| d.location.file == "AdminController.cs"));
    assert!(result.methods_analyzed > 7);
}

#[test]
fn test_excluded_types() {
    let compilation = load_pet_store();
    let config = Config {
        excluded_types: vec!["Plain*".to_string()],
        ..Default::default()
    };
    let result = analyze(&compilation, &config);
    assert_eq!(result.diagnostics.len(), 4);
    assert!(result
        .diagnostics
        .iter()
        .all(|d| d.location.file == "PetsController.cs"));
}

#[test]
fn test_parallel_and_sequential_agree() {
    let compilation = load_pet_store();
    let options = AnalyzerOptions::default();
    let parallel = Analyzer::new(&compilation).options(options.clone()).run();
    let sequential = Analyzer::new(&compilation).options(options).parallel(false).run();
    assert_eq!(parallel.diagnostics, sequential.diagnostics);
    assert_eq!(parallel.return_statements, sequential.return_statements);
}

#[test]
fn test_cancellation() {
    let compilation = load_pet_store();
    let result = Analyzer::new(&compilation)
        .cancellation(Arc::new(AtomicBool::new(true)))
        .run();
    assert!(result.cancelled);
    assert!(result.diagnostics.is_empty());
    assert!(!summarize(&result, &[], FailOn::Never).passed);
}

#[test]
fn test_custom_symbol_names() {
    let temp = TempDir::new().unwrap();
    std::fs::write(
        temp.path().join("minimal.yaml"),
        r#"
types:
  - name: IHttpResult
    kind: interface
  - name: StatusAttribute
  - name: DocumentsAttribute
  - name: BadRequest
    interfaces: [IHttpResult]
    attributes: [{ type: StatusAttribute, args: [400] }]
  - name: Pet
  - name: PetEndpoints
    methods:
      - name: GetPet
        returns: Pet
        file: PetEndpoints.cs
        attributes: [{ type: DocumentsAttribute, args: [200] }]
        return_statements:
          - { type: Pet, line: 5, column: 9 }
          - { type: BadRequest, line: 7, column: 9 }
"#,
    )
    .unwrap();

    let config: Config = serde_yaml::from_str(
        r#"
require_api_controller: false
symbols:
  action_result_interface: IHttpResult
  default_status_code_attribute: StatusAttribute
  response_metadata_attribute: DocumentsAttribute
"#,
    )
    .unwrap();
    config::validate(&config).unwrap();

    let files = collect_model_files(temp.path(), &config).unwrap();
    let compilation = load_compilation(&files).unwrap();
    let result = analyze(&compilation, &config);
    assert_eq!(result.diagnostics.len(), 1);
    assert_eq!(result.diagnostics[0].kind, DiagnosticKind::UndocumentedStatusCode);
    assert_eq!(result.diagnostics[0].status_code, Some(400));

    let cache = SymbolCache::with_names(&compilation, config.symbols.clone());
    assert!(!cache.missing().is_empty());
}

#[test]
fn test_mixed_yaml_and_json_models() {
    let temp = TempDir::new().unwrap();
    std::fs::copy(
        testdata_path().join("model/framework.yaml"),
        temp.path().join("framework.yaml"),
    )
    .unwrap();
    std::fs::write(
        temp.path().join("orders.json"),
        r#"{
  "file": "OrdersController.cs",
  "types": [
    { "name": "Order" },
    {
      "name": "OrdersController",
      "base": "ControllerBase",
      "attributes": [{ "type": "ApiControllerAttribute" }],
      "methods": [
        {
          "name": "GetOrder",
          "returns": "Task<ActionResult<Order>>",
          "attributes": [
            { "type": "ProducesResponseTypeAttribute", "args": [{ "typeof": "Order" }, 200] }
          ],
          "return_statements": [
            { "type": "Order", "line": 14, "column": 13 },
            { "type": "NotFoundObjectResult", "line": 16, "column": 17 }
          ]
        }
      ]
    }
  ]
}"#,
    )
    .unwrap();

    let files = collect_model_files(temp.path(), &Config::default()).unwrap();
    assert_eq!(files.len(), 2);
    let compilation = load_compilation(&files).unwrap();
    let result = analyze(&compilation, &Config::default());
    assert_eq!(result.diagnostics.len(), 1);
    let d = &result.diagnostics[0];
    assert_eq!(d.location.file, "OrdersController.cs");
    assert_eq!(d.location.line, 16);
    assert_eq!(d.status_code, Some(404));
}

#[test]
fn test_broken_model_is_an_error() {
    let temp = TempDir::new().unwrap();
    std::fs::write(
        temp.path().join("broken.yaml"),
        "types:\n  - name: Pet\n    base: Animal\n",
    )
    .unwrap();
    let files = collect_model_files(temp.path(), &Config::default()).unwrap();
    let err = load_compilation(&files).unwrap_err();
    assert!(err.to_string().contains("Animal"));
}

#[test]
fn test_run_check_exit_codes() {
    let model = testdata_path().join("model");

    let failing = CheckArgs {
        path: model.clone(),
        config: None,
        format: "json".to_string(),
        fail_on: FailOn::Warning,
        sequential: false,
    };
    assert_eq!(run_check(&failing).unwrap(), EXIT_FAILED);

    let never = CheckArgs {
        fail_on: FailOn::Never,
        sequential: true,
        ..failing
    };
    assert_eq!(run_check(&never).unwrap(), EXIT_SUCCESS);
}

#[test]
fn test_run_check_rejects_bad_input() {
    let bad_format = CheckArgs {
        path: testdata_path().join("model"),
        config: None,
        format: "xml".to_string(),
        fail_on: FailOn::Warning,
        sequential: false,
    };
    assert_eq!(run_check(&bad_format).unwrap(), convcheck::cli::EXIT_ERROR);

    let missing_path = CheckArgs {
        path: testdata_path().join("does-not-exist"),
        format: "pretty".to_string(),
        ..bad_format
    };
    assert_eq!(run_check(&missing_path).unwrap(), convcheck::cli::EXIT_ERROR);
}

#[test]
fn test_typeof_only_and_named_status_code_responses() {
    let temp = TempDir::new().unwrap();
    std::fs::copy(
        testdata_path().join("model/framework.yaml"),
        temp.path().join("framework.yaml"),
    )
    .unwrap();
    std::fs::write(
        temp.path().join("catalog.yaml"),
        r#"
file: CatalogController.cs
types:
  - name: Item
  - name: CatalogController
    base: ControllerBase
    attributes: [{ type: ApiControllerAttribute }]
    methods:
      - name: Fetch
        returns: ActionResult<Item>
        attributes:
          - type: ProducesResponseTypeAttribute
            args: [{ typeof: Item }]
        return_statements:
          - { type: Item, line: 3, column: 13 }
      - name: Named
        returns: ActionResult<Item>
        attributes:
          - type: ProducesResponseTypeAttribute
            named: { Type: { typeof: Item }, StatusCode: 200 }
        return_statements:
          - { type: Item, line: 9, column: 13 }
          - { type: NotFoundResult, line: 11, column: 17 }
"#,
    )
    .unwrap();

    let files = collect_model_files(temp.path(), &Config::default()).unwrap();
    let compilation = load_compilation(&files).unwrap();
    let result = analyze(&compilation, &Config::default());
    assert_eq!(result.methods_analyzed, 2);
    assert_eq!(summary_of(&result), vec![("CatalogController.cs".to_string(), 11, "API1001", Some(404))]);
}
