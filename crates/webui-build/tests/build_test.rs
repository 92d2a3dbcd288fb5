use std::path::Path;

use tempfile::TempDir;
use webui_build::{DockerfileError, PreparedDockerfile, rewrite_platform};

const DOCKERFILE: &str = "\
# syntax=docker/dockerfile:1
ARG USE_CUDA=false
FROM --platform=$BUILDPLATFORM node:22-alpine3.20 AS build
WORKDIR /app
FROM python:3.11-slim-bookworm AS base
";

fn write_dockerfile(dir: &Path, content: &str) -> std::path::PathBuf {
    let path = dir.join("Dockerfile");
    std::fs::write(&path, content).unwrap();
    path
}

fn temp_copies(dir: &Path) -> Vec<String> {
    std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|n| n.starts_with(".Dockerfile.") && n.ends_with(".tmp"))
        .collect()
}

// ── Rewrite ──

#[test]
fn rewrite_replaces_build_platform_placeholder() {
    let out = rewrite_platform(DOCKERFILE, "linux/amd64");

    assert!(out.contains("FROM --platform=linux/amd64 node:22-alpine3.20 AS build"));
    assert!(!out.contains("$BUILDPLATFORM"));
}

#[test]
fn rewrite_leaves_other_platform_forms_untouched() {
    let content =
        "FROM --platform=${BUILDPLATFORM} node AS a\nFROM --platform=$TARGETPLATFORM node AS b\n";

    assert_eq!(rewrite_platform(content, "linux/arm64"), content);
}

#[test]
fn rewrite_replaces_every_occurrence() {
    let content = "FROM --platform=$BUILDPLATFORM a\nFROM --platform=$BUILDPLATFORM b\n";
    let out = rewrite_platform(content, "linux/arm64");

    assert_eq!(out.matches("--platform=linux/arm64").count(), 2);
}

// ── PreparedDockerfile ──

#[test]
fn prepare_writes_rewritten_copy_next_to_original() {
    let tmp = TempDir::new().unwrap();
    let original = write_dockerfile(tmp.path(), DOCKERFILE);

    let prepared = PreparedDockerfile::prepare(&original, "linux/amd64").unwrap();

    assert_eq!(prepared.path().parent(), Some(tmp.path()));
    assert_eq!(prepared.replacements(), 1);
    let copy = std::fs::read_to_string(prepared.path()).unwrap();
    assert!(copy.contains("--platform=linux/amd64"));
}

#[test]
fn prepare_leaves_original_untouched() {
    let tmp = TempDir::new().unwrap();
    let original = write_dockerfile(tmp.path(), DOCKERFILE);

    let _prepared = PreparedDockerfile::prepare(&original, "linux/amd64").unwrap();

    assert_eq!(std::fs::read_to_string(&original).unwrap(), DOCKERFILE);
}

#[test]
fn copy_removed_on_drop() {
    let tmp = TempDir::new().unwrap();
    let original = write_dockerfile(tmp.path(), DOCKERFILE);

    let path = {
        let prepared = PreparedDockerfile::prepare(&original, "linux/amd64").unwrap();
        assert_eq!(temp_copies(tmp.path()).len(), 1);
        prepared.path().to_path_buf()
    };

    assert!(!path.exists());
    assert!(temp_copies(tmp.path()).is_empty());
}

#[test]
fn copy_removed_when_build_step_fails() {
    let tmp = TempDir::new().unwrap();
    let original = write_dockerfile(tmp.path(), DOCKERFILE);

    fn build(original: &Path) -> Result<(), String> {
        let _prepared =
            PreparedDockerfile::prepare(original, "linux/amd64").map_err(|e| e.to_string())?;
        Err("docker build exited with 1".to_owned())
    }

    assert!(build(&original).is_err());
    assert!(temp_copies(tmp.path()).is_empty());
}

#[test]
fn close_removes_copy() {
    let tmp = TempDir::new().unwrap();
    let original = write_dockerfile(tmp.path(), DOCKERFILE);

    let prepared = PreparedDockerfile::prepare(&original, "linux/amd64").unwrap();
    let path = prepared.path().to_path_buf();
    prepared.close().unwrap();

    assert!(!path.exists());
}

#[test]
fn prepare_without_placeholder_copies_verbatim() {
    let tmp = TempDir::new().unwrap();
    let content = "FROM python:3.11-slim\n";
    let original = write_dockerfile(tmp.path(), content);

    let prepared = PreparedDockerfile::prepare(&original, "linux/amd64").unwrap();

    assert_eq!(prepared.replacements(), 0);
    assert_eq!(std::fs::read_to_string(prepared.path()).unwrap(), content);
}

#[test]
fn prepare_missing_dockerfile_fails() {
    let tmp = TempDir::new().unwrap();

    let result = PreparedDockerfile::prepare(&tmp.path().join("Dockerfile"), "linux/amd64");

    assert!(matches!(result, Err(DockerfileError::Read { .. })));
    assert!(temp_copies(tmp.path()).is_empty());
}
