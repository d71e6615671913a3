//! CLI integration tests for the oas-codegen binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("oas-codegen"))
}

// Helper to create a temp spec file
fn write_temp_file(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

const MINIMAL_SPEC: &str = r#"{
    "openapi": "3.0.0",
    "info": { "title": "Minimal API", "version": "1.0.0" },
    "paths": {},
    "components": {
        "schemas": {
            "Widget": {
                "type": "object",
                "required": ["id"],
                "properties": {
                    "id": { "type": "integer", "format": "int64" },
                    "label": { "type": "string" }
                }
            }
        }
    }
}"#;

mod resolve_command {
    use super::*;

    #[test]
    fn basic_resolve() {
        cmd()
            .args([
                "resolve",
                "tests/fixtures/petstore.json",
                "--reference",
                "#/components/schemas/Pet",
            ])
            .assert()
            .success()
            .stdout(predicate::str::contains(r#""type":"object""#))
            .stdout(predicate::str::contains(r#""required":["id","name"]"#));
    }

    #[test]
    fn resolve_with_pretty() {
        cmd()
            .args([
                "resolve",
                "tests/fixtures/petstore.json",
                "--reference",
                "#/components/schemas/Pet",
                "--pretty",
            ])
            .assert()
            .success()
            // Pretty output has newlines and indentation
            .stdout(predicate::str::contains("{\n"));
    }

    #[test]
    fn resolve_with_output_file() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("resolved.json");

        cmd()
            .args([
                "resolve",
                "tests/fixtures/petstore.json",
                "--reference",
                "#/components/schemas/Category",
                "--output",
                output.to_str().unwrap(),
            ])
            .assert()
            .success()
            .stdout(predicate::str::is_empty());

        let content = fs::read_to_string(&output).unwrap();
        assert!(content.contains(r#""type":"object""#));
    }

    #[test]
    fn resolve_merges_all_of() {
        cmd()
            .args([
                "resolve",
                "tests/fixtures/compositions.json",
                "--reference",
                "#/components/schemas/AuditedRecord",
            ])
            .assert()
            .success()
            // Merged object carries properties from every member
            .stdout(predicate::str::contains(r#""id""#))
            .stdout(predicate::str::contains(r#""createdAt""#))
            .stdout(predicate::str::contains(r#""note""#))
            .stdout(predicate::str::contains("allOf").not());
    }

    #[test]
    fn resolve_exposes_one_of_variants() {
        cmd()
            .args([
                "resolve",
                "tests/fixtures/compositions.json",
                "--reference",
                "#/components/schemas/PetChoice",
            ])
            .assert()
            .success()
            .stdout(predicate::str::contains("x-one-of-variants"))
            .stdout(predicate::str::contains(r#""propertyName":"petType""#));
    }

    #[test]
    fn resolve_external_file_reference() {
        cmd()
            .args([
                "resolve",
                "tests/fixtures/external/main.yaml",
                "--reference",
                "#/components/schemas/Address",
            ])
            .assert()
            .success()
            // Country ref inside shared.yaml is inlined on fetch
            .stdout(predicate::str::contains(r#""street""#))
            .stdout(predicate::str::contains(r#""minLength":2"#));
    }

    #[test]
    fn unknown_reference_fails() {
        cmd()
            .args([
                "resolve",
                "tests/fixtures/petstore.json",
                "--reference",
                "#/components/schemas/Ghost",
            ])
            .assert()
            .code(2)
            .stderr(predicate::str::contains(
                "Reference not found: #/components/schemas/Ghost",
            ));
    }

    #[test]
    fn malformed_reference_fails() {
        cmd()
            .args([
                "resolve",
                "tests/fixtures/petstore.json",
                "--reference",
                "#/definitions/Pet",
            ])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("Malformed reference"));
    }

    #[test]
    fn circular_reference_fails() {
        let dir = TempDir::new().unwrap();
        let spec = write_temp_file(
            &dir,
            "spec.json",
            r##"{
                "openapi": "3.0.0",
                "info": { "title": "Loop API", "version": "1.0.0" },
                "paths": {},
                "components": {
                    "schemas": {
                        "Loop": { "$ref": "#/components/schemas/Loop" }
                    }
                }
            }"##,
        );

        cmd()
            .args([
                "resolve",
                spec.to_str().unwrap(),
                "--reference",
                "#/components/schemas/Loop",
            ])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("Circular reference detected"));
    }

    #[test]
    fn conflicting_all_of_types_fail() {
        cmd()
            .args([
                "resolve",
                "tests/fixtures/invalid/conflicting_types.json",
                "--reference",
                "#/components/schemas/Merged",
            ])
            .assert()
            .code(2)
            .stderr(predicate::str::contains(
                "Property 'id' has conflicting types in allOf schemas",
            ));
    }
}

mod schemas_command {
    use super::*;

    #[test]
    fn lists_resolved_registry() {
        cmd()
            .args(["schemas", "tests/fixtures/petstore.json"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Pet: object"))
            .stdout(predicate::str::contains("Order: object"))
            .stdout(predicate::str::contains("5 schemas resolved"));
    }

    #[test]
    fn json_output_is_a_registry_object() {
        let assert = cmd()
            .args(["schemas", "tests/fixtures/petstore.json", "--json"])
            .assert()
            .success();

        let output = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
        let registry: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert!(registry.get("Pet").is_some());
        assert!(registry.get("NewPet").is_some());
        // NewPet's allOf is resolved into a plain object
        assert_eq!(registry["NewPet"]["type"], "object");
        assert!(registry["NewPet"]["properties"].get("ownerEmail").is_some());
    }

    #[test]
    fn empty_registry_resolves_to_nothing() {
        let dir = TempDir::new().unwrap();
        let spec = write_temp_file(
            &dir,
            "bare.json",
            r#"{
                "openapi": "3.0.0",
                "info": { "title": "Bare API", "version": "1.0.0" },
                "paths": {}
            }"#,
        );

        cmd()
            .args(["schemas", spec.to_str().unwrap()])
            .assert()
            .success()
            .stdout(predicate::str::contains("0 schemas resolved"));
    }

    #[test]
    fn yaml_specs_are_supported() {
        cmd()
            .args(["schemas", "tests/fixtures/petstore.yaml"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Tag: string"))
            .stdout(predicate::str::contains("PetList: array"))
            .stdout(predicate::str::contains("3 schemas resolved"));
    }

    #[test]
    fn missing_discriminator_fails() {
        cmd()
            .args(["schemas", "tests/fixtures/invalid/missing_discriminator.json"])
            .assert()
            .code(2)
            .stderr(predicate::str::contains(
                "oneOf schema without discriminator property",
            ));
    }
}

mod generate_command {
    use super::*;

    #[test]
    fn generates_models_and_controllers() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("generated");

        cmd()
            .args([
                "generate",
                "tests/fixtures/petstore.json",
                "--output",
                out.to_str().unwrap(),
            ])
            .assert()
            .success()
            .stdout(predicate::str::contains("Generated 8 files"));

        let model_dir = out.join("src/main/kotlin/com/example/api/model");
        let controller_dir = out.join("src/main/kotlin/com/example/api/controller");
        assert!(model_dir.join("Pet.kt").exists());
        assert!(model_dir.join("NewPet.kt").exists());
        assert!(controller_dir.join("PetsController.kt").exists());
        assert!(controller_dir.join("StoreController.kt").exists());
        assert!(out.join("build.gradle.kts").exists());

        let pet = fs::read_to_string(model_dir.join("Pet.kt")).unwrap();
        assert!(pet.contains("package com.example.api.model"));
        assert!(pet.contains("data class Pet("));
        assert!(pet.contains("val id: Long"));
        assert!(pet.contains("@NotNull"));

        let controller = fs::read_to_string(controller_dir.join("PetsController.kt")).unwrap();
        assert!(controller.contains("interface PetsController {"));
        assert!(controller.contains("@GetMapping(\"/pets\")"));
        assert!(controller.contains("fun listPets("));
    }

    #[test]
    fn custom_base_package() {
        let dir = TempDir::new().unwrap();
        let spec = write_temp_file(&dir, "spec.json", MINIMAL_SPEC);
        let out = dir.path().join("generated");

        cmd()
            .args([
                "generate",
                spec.to_str().unwrap(),
                "--output",
                out.to_str().unwrap(),
                "--package",
                "io.acme.widgets",
            ])
            .assert()
            .success();

        let widget = out.join("src/main/kotlin/io/acme/widgets/model/Widget.kt");
        let content = fs::read_to_string(&widget).unwrap();
        assert!(content.contains("package io.acme.widgets.model"));
    }

    #[test]
    fn no_controllers_skips_controller_output() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("generated");

        cmd()
            .args([
                "generate",
                "tests/fixtures/petstore.json",
                "--output",
                out.to_str().unwrap(),
                "--no-controllers",
            ])
            .assert()
            .success()
            // 5 models + build file
            .stdout(predicate::str::contains("Generated 6 files"));

        assert!(!out.join("src/main/kotlin/com/example/api/controller").exists());
    }

    #[test]
    fn no_models_skips_model_output() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("generated");

        cmd()
            .args([
                "generate",
                "tests/fixtures/petstore.json",
                "--output",
                out.to_str().unwrap(),
                "--no-models",
            ])
            .assert()
            .success()
            // 2 controllers + build file
            .stdout(predicate::str::contains("Generated 3 files"));

        assert!(!out.join("src/main/kotlin/com/example/api/model").exists());
    }

    #[test]
    fn no_validation_omits_annotations() {
        let dir = TempDir::new().unwrap();
        let spec = write_temp_file(&dir, "spec.json", MINIMAL_SPEC);
        let out = dir.path().join("generated");

        cmd()
            .args([
                "generate",
                spec.to_str().unwrap(),
                "--output",
                out.to_str().unwrap(),
                "--no-validation",
                "--no-swagger",
            ])
            .assert()
            .success();

        let widget = out.join("src/main/kotlin/com/example/api/model/Widget.kt");
        let content = fs::read_to_string(&widget).unwrap();
        assert!(!content.contains("@NotNull"));
        assert!(!content.contains("@Schema"));
    }

    #[test]
    fn verbose_lists_generated_files() {
        let dir = TempDir::new().unwrap();
        let spec = write_temp_file(&dir, "spec.json", MINIMAL_SPEC);
        let out = dir.path().join("generated");

        cmd()
            .args([
                "generate",
                spec.to_str().unwrap(),
                "--output",
                out.to_str().unwrap(),
                "--verbose",
            ])
            .assert()
            .success()
            .stdout(predicate::str::contains("Widget.kt"))
            .stdout(predicate::str::contains("build.gradle.kts"));
    }

    #[test]
    fn metrics_flag_prints_resolution_report() {
        let dir = TempDir::new().unwrap();
        let spec = write_temp_file(&dir, "spec.json", MINIMAL_SPEC);
        let out = dir.path().join("generated");

        cmd()
            .args([
                "generate",
                spec.to_str().unwrap(),
                "--output",
                out.to_str().unwrap(),
                "--metrics",
            ])
            .assert()
            .success()
            .stdout(predicate::str::contains("Resolution metrics:"))
            .stdout(predicate::str::contains("schemas processed: 1"));
    }

    #[test]
    fn streaming_flag_handles_large_registries() {
        let dir = TempDir::new().unwrap();

        let mut schemas = String::new();
        for i in 0..60 {
            if i > 0 {
                schemas.push(',');
            }
            schemas.push_str(&format!(
                r#""Schema{i:03}": {{ "type": "object", "properties": {{ "value": {{ "type": "string" }} }} }}"#
            ));
        }
        let spec = write_temp_file(
            &dir,
            "big.json",
            &format!(
                r#"{{
                    "openapi": "3.0.0",
                    "info": {{ "title": "Big API", "version": "1.0.0" }},
                    "paths": {{}},
                    "components": {{ "schemas": {{ {schemas} }} }}
                }}"#
            ),
        );
        let out = dir.path().join("generated");

        cmd()
            .args([
                "generate",
                spec.to_str().unwrap(),
                "--output",
                out.to_str().unwrap(),
                "--streaming",
                "--metrics",
            ])
            .assert()
            .success()
            // 60 models + build file
            .stdout(predicate::str::contains("Generated 61 files"))
            .stdout(predicate::str::contains("schemas processed: 60"));
    }
}

mod error_handling {
    use super::*;

    #[test]
    fn file_not_found() {
        cmd()
            .args(["schemas", "/nonexistent/api.json"])
            .assert()
            .code(3)
            .stderr(predicate::str::contains("File not found"));
    }

    #[test]
    fn unsupported_extension() {
        let dir = TempDir::new().unwrap();
        let spec = write_temp_file(&dir, "api.txt", MINIMAL_SPEC);

        cmd()
            .args(["schemas", spec.to_str().unwrap()])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("Unsupported file format: .txt"));
    }

    #[test]
    fn invalid_json_spec() {
        let dir = TempDir::new().unwrap();
        let spec = write_temp_file(&dir, "bad.json", r#"{ not valid json"#);

        cmd()
            .args(["schemas", spec.to_str().unwrap()])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("Invalid JSON format"));
    }

    #[test]
    fn unsupported_version() {
        cmd()
            .args(["schemas", "tests/fixtures/invalid/bad_version.json"])
            .assert()
            .code(2)
            .stderr(predicate::str::contains(
                "Unsupported OpenAPI version: 3.1.0. Only 3.0.x is supported.",
            ));
    }

    #[test]
    fn missing_required_field() {
        cmd()
            .args(["schemas", "tests/fixtures/invalid/missing_paths.json"])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("Missing required field: paths"));
    }

    #[test]
    fn missing_external_file() {
        let dir = TempDir::new().unwrap();
        let spec = write_temp_file(
            &dir,
            "spec.json",
            r#"{
                "openapi": "3.0.0",
                "info": { "title": "Broken API", "version": "1.0.0" },
                "paths": {},
                "components": {
                    "schemas": {
                        "Broken": { "$ref": "ghost.yaml#/components/schemas/Nope" }
                    }
                }
            }"#,
        );

        cmd()
            .args([
                "resolve",
                spec.to_str().unwrap(),
                "--reference",
                "#/components/schemas/Broken",
            ])
            .assert()
            .code(3)
            .stderr(predicate::str::contains("External resolution failed"))
            .stderr(predicate::str::contains("ghost.yaml"));
    }
}

mod required_args {
    use super::*;

    #[test]
    fn resolve_requires_a_reference() {
        cmd()
            .args(["resolve", "tests/fixtures/petstore.json"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("--reference"));
    }

    #[test]
    fn generate_requires_a_spec() {
        cmd().arg("generate").assert().failure();
    }

    #[test]
    fn unknown_subcommand_is_rejected() {
        cmd().arg("transmogrify").assert().failure();
    }
}

mod help_and_version {
    use super::*;

    #[test]
    fn help_flag() {
        cmd()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains(
                "Resolve OpenAPI schemas and generate Kotlin Spring Boot code",
            ));
    }

    #[test]
    fn version_flag() {
        cmd()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("oas-codegen"));
    }

    #[test]
    fn generate_help() {
        cmd()
            .args(["generate", "--help"])
            .assert()
            .success()
            .stdout(predicate::str::contains("--output"))
            .stdout(predicate::str::contains("--package"))
            .stdout(predicate::str::contains("--streaming"))
            .stdout(predicate::str::contains("--metrics"));
    }

    #[test]
    fn resolve_help() {
        cmd()
            .args(["resolve", "--help"])
            .assert()
            .success()
            .stdout(predicate::str::contains("--reference"))
            .stdout(predicate::str::contains("--pretty"));
    }
}

/// Remote reference tests - served by an in-process mock server
#[cfg(feature = "remote")]
mod remote {
    use super::*;

    fn spec_with_remote_ref(dir: &TempDir, url: &str) -> std::path::PathBuf {
        write_temp_file(
            dir,
            "spec.json",
            &format!(
                r#"{{
                    "openapi": "3.0.0",
                    "info": {{ "title": "Remote API", "version": "1.0.0" }},
                    "paths": {{}},
                    "components": {{
                        "schemas": {{
                            "Money": {{ "$ref": "{url}#/components/schemas/Money" }}
                        }}
                    }}
                }}"#
            ),
        )
    }

    #[test]
    fn resolve_fetches_url_reference() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/schemas/common.json")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"components": {"schemas": {"Money": {"type": "string", "format": "decimal"}}}}"#,
            )
            .create();

        let dir = TempDir::new().unwrap();
        let url = format!("{}/schemas/common.json", server.url());
        let spec = spec_with_remote_ref(&dir, &url);

        cmd()
            .args([
                "resolve",
                spec.to_str().unwrap(),
                "--reference",
                "#/components/schemas/Money",
            ])
            .assert()
            .success()
            .stdout(predicate::str::contains(r#""format":"decimal""#));

        mock.assert();
    }

    #[test]
    fn no_remote_refuses_url_references() {
        let dir = TempDir::new().unwrap();
        let spec = spec_with_remote_ref(&dir, "https://example.invalid/api.json");

        cmd()
            .args([
                "resolve",
                spec.to_str().unwrap(),
                "--reference",
                "#/components/schemas/Money",
                "--no-remote",
            ])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("Remote references are disabled"));
    }

    #[test]
    fn http_error_fails_with_io_code() {
        let mut server = mockito::Server::new();
        server
            .mock("GET", "/schemas/missing.json")
            .with_status(404)
            .create();

        let dir = TempDir::new().unwrap();
        let url = format!("{}/schemas/missing.json", server.url());
        let spec = spec_with_remote_ref(&dir, &url);

        cmd()
            .args([
                "resolve",
                spec.to_str().unwrap(),
                "--reference",
                "#/components/schemas/Money",
            ])
            .assert()
            .code(3)
            .stderr(predicate::str::contains("Failed to fetch"));
    }
}
