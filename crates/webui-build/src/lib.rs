//! Build-definition preparation for `webui-deploy build`.
//!
//! # Build flow
//!
//! ```text
//! webui-deploy build
//!   1. Prepare  ── copy Dockerfile → .Dockerfile.XXXX.tmp, rewrite --platform=$BUILDPLATFORM
//!   2. Build    ── docker build -f .Dockerfile.XXXX.tmp --build-arg ... -t name:tag .
//!   3. Cleanup  ── temporary copy removed on drop, whether the build passed or not
//! ```
//!
//! The original Dockerfile is never modified.

pub mod dockerfile;

pub use dockerfile::{DockerfileError, PLATFORM_PLACEHOLDER, PreparedDockerfile, rewrite_platform};
