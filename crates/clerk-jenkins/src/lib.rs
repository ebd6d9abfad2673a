//! Jenkins integration: re-triggers the job behind a build report.

pub mod jenkins_build_runner;

pub use jenkins_build_runner::{JenkinsBuildRunner, JenkinsConfig, JenkinsCrumb};
